//! Signed-in identity.

use comicshelf_common::{AppResult, SharedKv};
use comicshelf_db::entities::SessionUser;
use comicshelf_db::repositories::SessionRepository;
use tracing::debug;

/// The identity a caller acts as. Loaded once at start-up and saved at exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    /// A signed-out session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session signed in as `user`.
    #[must_use]
    pub const fn signed_in(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    /// Restore the session persisted in `store`.
    pub async fn load(store: &SharedKv) -> Self {
        let user = SessionRepository::new(store.clone()).load().await;
        debug!(signed_in = user.is_some(), "Loaded session");
        Self { user }
    }

    /// Persist the session; a signed-out session removes the stored identity.
    pub async fn save(&self, store: &SharedKv) -> AppResult<()> {
        SessionRepository::new(store.clone())
            .save(self.user.as_ref())
            .await
    }

    #[must_use]
    pub const fn current(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(SessionUser::is_admin)
    }

    pub fn sign_in(&mut self, user: SessionUser) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comicshelf_db::entities::UserRole;
    use comicshelf_db::test_utils::memory_store;

    fn user(role: UserRole) -> SessionUser {
        SessionUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let store = memory_store();
        let mut session = Session::load(&store).await;
        assert!(!session.is_authenticated());

        session.sign_in(user(UserRole::Admin));
        session.save(&store).await.unwrap();

        let restored = Session::load(&store).await;
        assert!(restored.is_authenticated());
        assert!(restored.is_admin());
        assert_eq!(restored, session);
    }

    #[tokio::test]
    async fn test_sign_out_clears_stored_identity() {
        let store = memory_store();
        let mut session = Session::signed_in(user(UserRole::User));
        session.save(&store).await.unwrap();
        assert!(!session.is_admin());

        session.sign_out();
        session.save(&store).await.unwrap();

        assert!(store.get("currentUser").await.unwrap().is_none());
        assert!(Session::load(&store).await.current().is_none());
    }
}
