//! User repository.

use comicshelf_common::{AppResult, SharedKv};

use crate::collection::JsonCollection;
use crate::entities::User;

/// Storage key of the user collection.
pub const USERS_KEY: &str = "users";

/// User repository over the `users` collection.
#[derive(Clone)]
pub struct UserRepository {
    users: JsonCollection<User>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub fn new(store: SharedKv) -> Self {
        Self {
            users: JsonCollection::new(store, USERS_KEY),
        }
    }

    /// Load every user. Unreadable data yields an empty list.
    pub async fn find_all(&self) -> Vec<User> {
        self.users.load().await
    }

    /// Load every user, surfacing storage errors.
    pub async fn try_find_all(&self) -> AppResult<Vec<User>> {
        self.users.try_load().await
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> Option<User> {
        self.find_all().await.into_iter().find(|u| u.id == id)
    }

    /// Replace the stored collection. Failures are logged.
    pub async fn save_all(&self, users: &[User]) {
        self.users.save(users).await;
    }

    /// Replace the stored collection, surfacing storage errors.
    pub async fn try_save_all(&self, users: &[User]) -> AppResult<()> {
        self.users.try_save(users).await
    }
}
