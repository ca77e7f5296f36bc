//! Review repository.

use comicshelf_common::{AppResult, SharedKv};

use crate::collection::JsonCollection;
use crate::entities::Review;

/// Storage key of the review collection.
pub const REVIEWS_KEY: &str = "reviews";

/// Review repository. Reviews are stored newest-first.
#[derive(Clone)]
pub struct ReviewRepository {
    reviews: JsonCollection<Review>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub fn new(store: SharedKv) -> Self {
        Self {
            reviews: JsonCollection::new(store, REVIEWS_KEY),
        }
    }

    /// Load every review, newest first.
    pub async fn find_all(&self) -> Vec<Review> {
        self.reviews.load().await
    }

    /// Load every review, surfacing storage errors.
    pub async fn try_find_all(&self) -> AppResult<Vec<Review>> {
        self.reviews.try_load().await
    }

    /// Put `review` at the head of the collection.
    pub async fn prepend(&self, review: Review) {
        let mut reviews = self.find_all().await;
        reviews.insert(0, review);
        self.reviews.save(&reviews).await;
    }

    /// Replace the stored collection, surfacing storage errors.
    pub async fn try_save_all(&self, reviews: &[Review]) -> AppResult<()> {
        self.reviews.try_save(reviews).await
    }
}
