//! Review board.

use chrono::Utc;
use comicshelf_common::{AppError, AppResult, IdGenerator};
use comicshelf_db::entities::{Review, SessionUser};
use comicshelf_db::repositories::ReviewRepository;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Reviews shown on the landing page.
pub const DEFAULT_RECENT_REVIEWS: usize = 6;

/// Longest accepted review comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 500;

/// Review board service. The board stores what it is given; the rating and
/// comment rules live in [`ReviewBoard::submit`].
#[derive(Clone)]
pub struct ReviewBoard {
    review_repo: ReviewRepository,
    id_gen: IdGenerator,
}

/// Review to store as-is.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: String,
    pub username: String,
    pub rating: u8,
    pub comment: String,
}

/// Review form contents.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,

    pub comment: String,
}

impl ReviewBoard {
    /// Create a new review board.
    #[must_use]
    pub const fn new(review_repo: ReviewRepository) -> Self {
        Self {
            review_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Store a review at the head of the board.
    pub async fn add(&self, input: NewReview) -> Review {
        let review = Review {
            id: self.id_gen.generate(),
            user_id: input.user_id,
            username: input.username,
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
        };

        self.review_repo.prepend(review.clone()).await;
        info!(review_id = %review.id, rating = review.rating, "Added review");
        review
    }

    /// Validate and store a review from `user`.
    pub async fn submit(&self, user: &SessionUser, input: ReviewInput) -> AppResult<Review> {
        input.validate()?;
        let comment = input.comment.trim();
        if comment.is_empty() {
            return Err(AppError::Validation("comment: must not be blank".to_string()));
        }
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::Validation(format!(
                "comment: at most {MAX_COMMENT_CHARS} characters"
            )));
        }

        Ok(self
            .add(NewReview {
                user_id: user.id.clone(),
                username: user.username.clone(),
                rating: input.rating,
                comment: comment.to_string(),
            })
            .await)
    }

    /// The `limit` newest reviews.
    pub async fn recent(&self, limit: usize) -> Vec<Review> {
        let mut reviews = self.review_repo.find_all().await;
        reviews.truncate(limit);
        reviews
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use comicshelf_db::entities::UserRole;
    use comicshelf_db::test_utils::memory_store;

    fn board() -> ReviewBoard {
        ReviewBoard::new(ReviewRepository::new(memory_store()))
    }

    fn new_review(comment: &str, rating: u8) -> NewReview {
        NewReview {
            user_id: "u1".to_string(),
            username: "alice".to_string(),
            rating,
            comment: comment.to_string(),
        }
    }

    fn alice() -> SessionUser {
        SessionUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            role: UserRole::User,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let board = board();
        board.add(new_review("R1", 5)).await;
        board.add(new_review("R2", 4)).await;
        board.add(new_review("R3", 3)).await;

        let comments: Vec<_> = board
            .recent(2)
            .await
            .into_iter()
            .map(|r| r.comment)
            .collect();
        assert_eq!(comments, vec!["R3", "R2"]);
        assert_eq!(board.recent(DEFAULT_RECENT_REVIEWS).await.len(), 3);
    }

    #[tokio::test]
    async fn test_add_does_not_validate() {
        let board = board();
        let review = board.add(new_review("", 9)).await;
        assert_eq!(review.rating, 9);
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let board = board();

        for (rating, comment) in [(0, "ok"), (6, "ok"), (3, "   ")] {
            let err = board
                .submit(
                    &alice(),
                    ReviewInput {
                        rating,
                        comment: comment.to_string(),
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        let too_long = ReviewInput {
            rating: 4,
            comment: "x".repeat(501),
        };
        assert!(board.submit(&alice(), too_long).await.is_err());

        let review = board
            .submit(
                &alice(),
                ReviewInput {
                    rating: 5,
                    comment: "  Great art  ".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(review.comment, "Great art");
        assert_eq!(review.username, "alice");
        assert_eq!(board.recent(6).await, vec![review]);
    }
}
