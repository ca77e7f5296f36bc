//! Visitor counter storage.

use comicshelf_common::{AppResult, SharedKv};
use tracing::warn;

/// Key prefix of per-host visitor counters.
pub const VISITOR_COUNT_PREFIX: &str = "visitorCount_";

/// Per-hostname visit counter stored as a decimal string.
#[derive(Clone)]
pub struct VisitorRepository {
    store: SharedKv,
    key: String,
}

impl VisitorRepository {
    /// Create a counter for `hostname`.
    #[must_use]
    pub fn new(store: SharedKv, hostname: &str) -> Self {
        Self {
            store,
            key: format!("{VISITOR_COUNT_PREFIX}{hostname}"),
        }
    }

    /// Storage key of this counter.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current count. Missing or unparseable values count as zero.
    pub async fn get(&self) -> u64 {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read visitor count");
                0
            }
        }
    }

    /// Store `count`.
    pub async fn set(&self, count: u64) -> AppResult<()> {
        self.store.set(&self.key, &count.to_string()).await
    }
}
