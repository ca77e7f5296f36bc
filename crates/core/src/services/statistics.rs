//! Admin dashboard statistics.

use comicshelf_db::entities::ComicStatus;
use serde::Serialize;

use super::comic::{AuthorCount, ContentService, DEFAULT_TOP_AUTHORS};
use super::ticket::{TicketDesk, TicketStats};
use super::visitor::VisitorCounter;

/// Site-wide figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOverview {
    pub visits: u64,
    pub published: usize,
    pub pending: usize,
    pub rejected: usize,
    /// Pages across all published comics.
    pub total_pages: usize,
    pub top_authors: Vec<AuthorCount>,
    pub tickets: TicketStats,
}

/// Aggregates figures from the other services.
#[derive(Clone)]
pub struct StatisticsService {
    content: ContentService,
    tickets: TicketDesk,
    visitors: VisitorCounter,
}

impl StatisticsService {
    #[must_use]
    pub const fn new(content: ContentService, tickets: TicketDesk, visitors: VisitorCounter) -> Self {
        Self {
            content,
            tickets,
            visitors,
        }
    }

    /// Compute the overview from the current collections.
    pub async fn overview(&self) -> SiteOverview {
        let comics = self.content.all_comics().await;
        let count = |status: ComicStatus| comics.iter().filter(|c| c.status == status).count();

        SiteOverview {
            visits: self.visitors.count().await,
            published: count(ComicStatus::Published),
            pending: count(ComicStatus::Pending),
            rejected: count(ComicStatus::Rejected),
            total_pages: comics
                .iter()
                .filter(|c| c.is_published())
                .map(|c| c.images.len())
                .sum(),
            top_authors: self.content.top_authors(DEFAULT_TOP_AUTHORS).await,
            tickets: self.tickets.stats().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::comic::{CreateComicInput, ModerationDecision};
    use crate::services::ticket::NewTicket;
    use comicshelf_db::entities::{TicketCategory, TicketPriority};
    use comicshelf_db::repositories::{ComicRepository, TicketRepository, VisitorRepository};
    use comicshelf_db::test_utils::memory_store;

    fn comic(title: &str, pages: usize) -> CreateComicInput {
        CreateComicInput {
            title: title.to_string(),
            description: String::new(),
            images: vec!["page".to_string(); pages],
        }
    }

    #[tokio::test]
    async fn test_overview() {
        let store = memory_store();
        let content = ContentService::new(ComicRepository::new(store.clone()));
        let tickets = TicketDesk::new(TicketRepository::new(store.clone()));
        let visitors = VisitorCounter::new(VisitorRepository::new(store, "localhost"));
        let stats = StatisticsService::new(content.clone(), tickets.clone(), visitors.clone());

        content.create(comic("Admin", 3), None).await.unwrap();
        let accepted = content
            .create(comic("Accepted", 2), Some("u1".to_string()))
            .await
            .unwrap();
        content.moderate(&accepted.id, ModerationDecision::Publish).await;
        let declined = content
            .create(comic("Declined", 4), Some("u2".to_string()))
            .await
            .unwrap();
        content.moderate(&declined.id, ModerationDecision::Reject).await;
        content
            .create(comic("Waiting", 1), Some("u2".to_string()))
            .await
            .unwrap();

        tickets
            .create(NewTicket {
                user_id: "u1".to_string(),
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                subject: "Help".to_string(),
                message: "Please".to_string(),
                category: TicketCategory::Other,
                priority: TicketPriority::Urgent,
            })
            .await;
        visitors.record_visit().await;

        let overview = stats.overview().await;
        assert_eq!(overview.visits, 1);
        assert_eq!(overview.published, 2);
        assert_eq!(overview.pending, 1);
        assert_eq!(overview.rejected, 1);
        assert_eq!(overview.total_pages, 5);
        assert_eq!(overview.top_authors.len(), 1);
        assert_eq!(overview.top_authors[0].author_id, "u1");
        assert_eq!(overview.tickets.total, 1);
        assert_eq!(overview.tickets.urgent, 1);
    }
}
