//! Review record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A site review left by a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub username: String,
    /// Star rating, 1 to 5 when submitted through the review form.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
