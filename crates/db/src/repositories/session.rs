//! Persisted session identity.

use comicshelf_common::{AppResult, SharedKv};
use tracing::warn;

use crate::entities::SessionUser;

/// Storage key of the signed-in identity.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Reads and writes the `currentUser` key.
#[derive(Clone)]
pub struct SessionRepository {
    store: SharedKv,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(store: SharedKv) -> Self {
        Self { store }
    }

    /// Stored identity, if any. Unreadable data counts as signed out.
    pub async fn load(&self) -> Option<SessionUser> {
        let raw = match self.store.get(CURRENT_USER_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read session");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Discarding unparseable session");
                None
            }
        }
    }

    /// Store `user`, or remove the key when `None`.
    pub async fn save(&self, user: Option<&SessionUser>) -> AppResult<()> {
        match user {
            Some(user) => {
                let raw = serde_json::to_string(user)?;
                self.store.set(CURRENT_USER_KEY, &raw).await
            }
            None => self.store.remove(CURRENT_USER_KEY).await,
        }
    }
}
