//! Visitor counter.

use comicshelf_db::repositories::VisitorRepository;
use tracing::error;

/// Counts visits for one hostname.
#[derive(Clone)]
pub struct VisitorCounter {
    visitor_repo: VisitorRepository,
}

impl VisitorCounter {
    #[must_use]
    pub const fn new(visitor_repo: VisitorRepository) -> Self {
        Self { visitor_repo }
    }

    /// Count a visit and return the new total.
    pub async fn record_visit(&self) -> u64 {
        let count = self.visitor_repo.get().await.saturating_add(1);
        if let Err(e) = self.visitor_repo.set(count).await {
            error!(key = %self.visitor_repo.key(), error = %e, "Failed to store visitor count");
        }
        count
    }

    /// Current total.
    pub async fn count(&self) -> u64 {
        self.visitor_repo.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comicshelf_db::test_utils::memory_store;

    #[tokio::test]
    async fn test_record_visit() {
        let store = memory_store();
        let counter = VisitorCounter::new(VisitorRepository::new(store.clone(), "localhost"));
        let other = VisitorCounter::new(VisitorRepository::new(store, "comics.example"));

        assert_eq!(counter.count().await, 0);
        assert_eq!(counter.record_visit().await, 1);
        assert_eq!(counter.record_visit().await, 2);
        assert_eq!(counter.count().await, 2);
        assert_eq!(other.count().await, 0);
    }
}
