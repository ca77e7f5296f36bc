//! Support ticket records.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use comicshelf_common::AppError;
use serde::{Deserialize, Serialize};

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(AppError::BadRequest(format!("Unknown ticket status: {other}"))),
        }
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for TicketPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(AppError::BadRequest(format!("Unknown ticket priority: {other}"))),
        }
    }
}

/// Ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketCategory {
    Technical,
    Billing,
    FeatureRequest,
    BugReport,
    #[default]
    Other,
}

impl TicketCategory {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Billing => "billing",
            Self::FeatureRequest => "feature-request",
            Self::BugReport => "bug-report",
            Self::Other => "other",
        }
    }
}

impl FromStr for TicketCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(Self::Technical),
            "billing" => Ok(Self::Billing),
            "feature-request" => Ok(Self::FeatureRequest),
            "bug-report" => Ok(Self::BugReport),
            "other" => Ok(Self::Other),
            other => Err(AppError::BadRequest(format!("Unknown ticket category: {other}"))),
        }
    }
}

/// A message appended to a ticket thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub ticket_id: String,
    pub user_id: String,
    pub username: String,
    pub message: String,
    /// Set when the author held the admin role.
    #[serde(default)]
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// A support ticket with its response thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub category: TicketCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Responses in the order they were added.
    #[serde(default)]
    pub responses: Vec<TicketResponse>,
    #[serde(default)]
    pub is_guest: bool,
}
