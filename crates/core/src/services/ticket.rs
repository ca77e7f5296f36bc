//! Support ticket desk.

use std::sync::Arc;

use chrono::Utc;
use comicshelf_common::{AppError, AppResult, IdGenerator};
use comicshelf_db::entities::{
    SessionUser, Ticket, TicketCategory, TicketPriority, TicketResponse, TicketStatus,
};
use comicshelf_db::repositories::TicketRepository;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::session::Session;

/// Rules applied when responses are added to a ticket.
pub trait TicketPolicy: Send + Sync {
    /// Whether a ticket in `status` may receive another response.
    fn accepts_response(&self, status: TicketStatus) -> bool {
        status != TicketStatus::Closed
    }

    /// Status a ticket moves to once a response has been appended.
    fn on_response_added(&self, status: TicketStatus) -> TicketStatus {
        match status {
            TicketStatus::Open => TicketStatus::InProgress,
            other => other,
        }
    }
}

/// Closed tickets refuse responses; open tickets move to in-progress on the
/// first response.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTicketPolicy;

impl TicketPolicy for DefaultTicketPolicy {}

/// Ticket desk service.
#[derive(Clone)]
pub struct TicketDesk {
    ticket_repo: TicketRepository,
    policy: Arc<dyn TicketPolicy>,
    id_gen: IdGenerator,
}

/// Ticket submitted by a signed-in user.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
}

/// Ticket submitted without an account.
#[derive(Debug, Clone)]
pub struct GuestTicket {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
}

/// Support form contents. Guest fields are only read when the session is
/// signed out.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TicketInput {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,

    #[serde(default)]
    pub category: TicketCategory,

    #[serde(default)]
    pub priority: TicketPriority,

    #[validate(length(min = 1, max = 64))]
    pub guest_name: Option<String>,

    #[validate(email)]
    pub guest_email: Option<String>,
}

/// Response to append to a ticket.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub user_id: String,
    pub username: String,
    pub message: String,
    pub is_staff: bool,
}

/// Admin list filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    /// Case-insensitive substring of the subject or the requester's username.
    pub query: Option<String>,
}

impl TicketFilter {
    fn matches(&self, ticket: &Ticket, query: Option<&str>) -> bool {
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        query.is_none_or(|q| {
            ticket.subject.to_lowercase().contains(q) || ticket.username.to_lowercase().contains(q)
        })
    }
}

/// Ticket counts by status, plus urgent and guest totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
    pub urgent: usize,
    pub guest: usize,
}

impl TicketDesk {
    /// Create a ticket desk with the default policy.
    #[must_use]
    pub fn new(ticket_repo: TicketRepository) -> Self {
        Self::with_policy(ticket_repo, Arc::new(DefaultTicketPolicy))
    }

    /// Create a ticket desk with a custom response policy.
    #[must_use]
    pub fn with_policy(ticket_repo: TicketRepository, policy: Arc<dyn TicketPolicy>) -> Self {
        Self {
            ticket_repo,
            policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Open a ticket for a signed-in user.
    pub async fn create(&self, input: NewTicket) -> Ticket {
        self.insert(input, false).await
    }

    /// Open a ticket for a visitor without an account.
    pub async fn create_guest(&self, input: GuestTicket) -> Ticket {
        let ticket = NewTicket {
            user_id: self.id_gen.generate_guest_id(),
            username: input.name,
            email: input.email,
            subject: input.subject,
            message: input.message,
            category: input.category,
            priority: input.priority,
        };
        self.insert(ticket, true).await
    }

    async fn insert(&self, input: NewTicket, is_guest: bool) -> Ticket {
        let now = Utc::now();
        let ticket = Ticket {
            id: self.id_gen.generate(),
            user_id: input.user_id,
            username: input.username,
            email: input.email,
            subject: input.subject,
            message: input.message,
            status: TicketStatus::Open,
            priority: input.priority,
            category: input.category,
            created_at: now,
            updated_at: now,
            responses: Vec::new(),
            is_guest,
        };

        let mut tickets = self.ticket_repo.find_all().await;
        tickets.push(ticket.clone());
        self.ticket_repo.save_all(&tickets).await;

        info!(
            ticket_id = %ticket.id,
            priority = ticket.priority.as_str(),
            is_guest,
            "Created ticket"
        );
        ticket
    }

    /// Submit the support form as whoever `session` is signed in as, or as a
    /// guest identified by the form's name and email.
    pub async fn submit(&self, session: &Session, input: TicketInput) -> AppResult<Ticket> {
        input.validate()?;

        if let Some(user) = session.current() {
            return Ok(self
                .create(NewTicket {
                    user_id: user.id.clone(),
                    username: user.username.clone(),
                    email: user.email.clone(),
                    subject: input.subject,
                    message: input.message,
                    category: input.category,
                    priority: input.priority,
                })
                .await);
        }

        let (Some(name), Some(email)) = (input.guest_name, input.guest_email) else {
            return Err(AppError::Validation(
                "guest tickets need a name and an email".to_string(),
            ));
        };

        Ok(self
            .create_guest(GuestTicket {
                name,
                email,
                subject: input.subject,
                message: input.message,
                category: input.category,
                priority: input.priority,
            })
            .await)
    }

    /// Get a ticket by ID.
    pub async fn get(&self, id: &str) -> Option<Ticket> {
        self.ticket_repo.find_by_id(id).await
    }

    /// Every ticket in submission order.
    pub async fn all(&self) -> Vec<Ticket> {
        self.ticket_repo.find_all().await
    }

    /// Tickets opened by `user_id`.
    pub async fn for_user(&self, user_id: &str) -> Vec<Ticket> {
        self.ticket_repo
            .find_all()
            .await
            .into_iter()
            .filter(|t| t.user_id == user_id)
            .collect()
    }

    /// Tickets matching `filter`.
    pub async fn search(&self, filter: &TicketFilter) -> Vec<Ticket> {
        let query = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        self.ticket_repo
            .find_all()
            .await
            .into_iter()
            .filter(|t| filter.matches(t, query.as_deref()))
            .collect()
    }

    /// Set a ticket's status. Any status may follow any other.
    pub async fn update_status(&self, id: &str, status: TicketStatus) -> Option<Ticket> {
        let mut tickets = self.ticket_repo.find_all().await;
        let ticket = tickets.iter_mut().find(|t| t.id == id)?;

        ticket.status = status;
        ticket.updated_at = Utc::now();
        let updated = ticket.clone();

        self.ticket_repo.save_all(&tickets).await;
        info!(ticket_id = %id, status = status.as_str(), "Updated ticket status");
        Some(updated)
    }

    /// Append a response. Returns `None` if the ticket does not exist or
    /// does not accept responses in its current status.
    pub async fn add_response(&self, ticket_id: &str, input: NewResponse) -> Option<TicketResponse> {
        let mut tickets = self.ticket_repo.find_all().await;
        let ticket = tickets.iter_mut().find(|t| t.id == ticket_id)?;

        if !self.policy.accepts_response(ticket.status) {
            return None;
        }

        let now = Utc::now();
        let response = TicketResponse {
            id: self.id_gen.generate(),
            ticket_id: ticket_id.to_string(),
            user_id: input.user_id,
            username: input.username,
            message: input.message,
            is_staff: input.is_staff,
            created_at: now,
        };

        ticket.responses.push(response.clone());
        ticket.updated_at = now;
        ticket.status = self.policy.on_response_added(ticket.status);
        let status = ticket.status;

        self.ticket_repo.save_all(&tickets).await;
        info!(
            ticket_id = %ticket_id,
            is_staff = response.is_staff,
            status = status.as_str(),
            "Added ticket response"
        );
        Some(response)
    }

    /// Respond as `user`; administrators respond as staff.
    pub async fn respond_as(
        &self,
        user: &SessionUser,
        ticket_id: &str,
        message: &str,
    ) -> AppResult<TicketResponse> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("message: must not be blank".to_string()));
        }

        let ticket = self
            .get(ticket_id)
            .await
            .ok_or_else(|| AppError::TicketNotFound(ticket_id.to_string()))?;
        if !self.policy.accepts_response(ticket.status) {
            return Err(AppError::BadRequest(format!(
                "Ticket {ticket_id} is {} and accepts no responses",
                ticket.status.as_str()
            )));
        }

        self.add_response(
            ticket_id,
            NewResponse {
                user_id: user.id.clone(),
                username: user.username.clone(),
                message: message.to_string(),
                is_staff: user.is_admin(),
            },
        )
        .await
        .ok_or_else(|| AppError::TicketNotFound(ticket_id.to_string()))
    }

    /// Counts over the current collection.
    pub async fn stats(&self) -> TicketStats {
        let tickets = self.ticket_repo.find_all().await;

        let mut stats = TicketStats {
            total: tickets.len(),
            ..Default::default()
        };
        for ticket in &tickets {
            match ticket.status {
                TicketStatus::Open => stats.open += 1,
                TicketStatus::InProgress => stats.in_progress += 1,
                TicketStatus::Resolved => stats.resolved += 1,
                TicketStatus::Closed => stats.closed += 1,
            }
            if ticket.priority == TicketPriority::Urgent {
                stats.urgent += 1;
            }
            if ticket.is_guest {
                stats.guest += 1;
            }
        }
        stats
    }

    /// Delete a ticket and its responses. Returns `false` if it did not exist.
    pub async fn delete(&self, id: &str) -> bool {
        let mut tickets = self.ticket_repo.find_all().await;
        let before = tickets.len();
        tickets.retain(|t| t.id != id);
        if tickets.len() == before {
            return false;
        }

        self.ticket_repo.save_all(&tickets).await;
        info!(ticket_id = %id, "Deleted ticket");
        true
    }
}
