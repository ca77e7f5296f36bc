//! Ticket repository.

use comicshelf_common::{AppResult, SharedKv};

use crate::collection::JsonCollection;
use crate::entities::Ticket;

/// Storage key of the ticket collection.
pub const TICKETS_KEY: &str = "support_tickets";

/// Ticket repository. Responses are embedded in their ticket.
#[derive(Clone)]
pub struct TicketRepository {
    tickets: JsonCollection<Ticket>,
}

impl TicketRepository {
    /// Create a new ticket repository.
    #[must_use]
    pub fn new(store: SharedKv) -> Self {
        Self {
            tickets: JsonCollection::new(store, TICKETS_KEY),
        }
    }

    /// Load every ticket in stored order.
    pub async fn find_all(&self) -> Vec<Ticket> {
        self.tickets.load().await
    }

    /// Load every ticket, surfacing storage errors.
    pub async fn try_find_all(&self) -> AppResult<Vec<Ticket>> {
        self.tickets.try_load().await
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(&self, id: &str) -> Option<Ticket> {
        self.find_all().await.into_iter().find(|t| t.id == id)
    }

    /// Replace the stored collection. Failures are logged.
    pub async fn save_all(&self, tickets: &[Ticket]) {
        self.tickets.save(tickets).await;
    }

    /// Replace the stored collection, surfacing storage errors.
    pub async fn try_save_all(&self, tickets: &[Ticket]) -> AppResult<()> {
        self.tickets.try_save(tickets).await
    }
}
