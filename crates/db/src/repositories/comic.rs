//! Comic repository.
//!
//! Comics are written to two keys: the primary `comics_shared` and the
//! mirror `comics_network_shared`. Loads prefer the mirror whenever it holds
//! a non-empty collection.

use comicshelf_common::{AppResult, SharedKv};
use tracing::debug;

use crate::collection::JsonCollection;
use crate::entities::Comic;

/// Primary storage key of the comic collection.
pub const COMICS_KEY: &str = "comics_shared";

/// Mirror storage key of the comic collection.
pub const COMICS_MIRROR_KEY: &str = "comics_network_shared";

/// Comic repository.
#[derive(Clone)]
pub struct ComicRepository {
    primary: JsonCollection<Comic>,
    mirror: JsonCollection<Comic>,
}

impl ComicRepository {
    /// Create a new comic repository.
    #[must_use]
    pub fn new(store: SharedKv) -> Self {
        Self {
            primary: JsonCollection::new(store.clone(), COMICS_KEY),
            mirror: JsonCollection::new(store, COMICS_MIRROR_KEY),
        }
    }

    /// Load every comic in stored order.
    pub async fn find_all(&self) -> Vec<Comic> {
        let mirrored = self.mirror.load().await;
        if !mirrored.is_empty() {
            debug!(count = mirrored.len(), "Loaded comics from mirror");
            return mirrored;
        }
        self.primary.load().await
    }

    /// Load every comic, surfacing storage errors.
    pub async fn try_find_all(&self) -> AppResult<Vec<Comic>> {
        let mirrored = self.mirror.try_load().await?;
        if !mirrored.is_empty() {
            return Ok(mirrored);
        }
        self.primary.try_load().await
    }

    /// Find a comic by ID.
    pub async fn find_by_id(&self, id: &str) -> Option<Comic> {
        self.find_all().await.into_iter().find(|c| c.id == id)
    }

    /// Write `comics` to both keys. Failures are logged.
    pub async fn save_all(&self, comics: &[Comic]) {
        self.primary.save(comics).await;
        self.mirror.save(comics).await;
    }

    /// Write `comics` to both keys, surfacing storage errors.
    pub async fn try_save_all(&self, comics: &[Comic]) -> AppResult<()> {
        self.primary.try_save(comics).await?;
        self.mirror.try_save(comics).await
    }
}
