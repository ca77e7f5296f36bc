//! Sign-in, registration and sign-out.

use comicshelf_common::AppResult;
use comicshelf_db::entities::{SessionUser, UserRole};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::session::Session;
use super::user::{NewUser, UserDirectory};

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    directory: UserDirectory,
}

/// Input for self-registration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(directory: UserDirectory) -> Self {
        Self { directory }
    }

    /// Check credentials and sign `session` in.
    pub async fn login(
        &self,
        session: &mut Session,
        identifier: &str,
        password: &str,
    ) -> AppResult<SessionUser> {
        let user = self.directory.authenticate(identifier, password).await?;
        info!(user_id = %user.id, "User signed in");
        session.sign_in(user.clone());
        Ok(user)
    }

    /// Create a `user`-role account and sign `session` in as it.
    pub async fn register(
        &self,
        session: &mut Session,
        input: RegisterInput,
    ) -> AppResult<SessionUser> {
        input.validate()?;

        let user: SessionUser = self
            .directory
            .create_user(NewUser {
                username: input.username,
                email: input.email,
                password: input.password,
                role: UserRole::User,
            })
            .await?
            .into();

        session.sign_in(user.clone());
        Ok(user)
    }

    /// Sign `session` out.
    pub fn logout(&self, session: &mut Session) {
        if let Some(user) = session.current() {
            info!(user_id = %user.id, "User signed out");
        }
        session.sign_out();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use comicshelf_common::AppError;
    use comicshelf_common::config::AdminConfig;
    use comicshelf_db::repositories::UserRepository;
    use comicshelf_db::test_utils::memory_store;

    fn auth_service() -> AuthService {
        AuthService::new(UserDirectory::new(
            UserRepository::new(memory_store()),
            AdminConfig::default(),
        ))
    }

    fn register_input(username: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = auth_service();
        let mut session = Session::anonymous();

        let registered = auth
            .register(&mut session, register_input("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.current(), Some(&registered));

        auth.logout(&mut session);
        assert!(!session.is_authenticated());

        let user = auth
            .login(&mut session, "alice@x.com", "secret1")
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);
        assert!(!serde_json::to_string(&user).unwrap().contains("password"));

        let mut other = Session::anonymous();
        let err = auth.login(&mut other, "alice@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        assert!(!other.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let auth = auth_service();
        let mut session = Session::anonymous();

        let short = auth
            .register(&mut session, register_input("bob", "bob@x.com", "12345"))
            .await
            .unwrap_err();
        assert!(matches!(short, AppError::Validation(_)));

        let bad_email = auth
            .register(&mut session, register_input("bob", "not-an-email", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(bad_email, AppError::Validation(_)));

        let empty_name = auth
            .register(&mut session, register_input("", "bob@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(empty_name, AppError::Validation(_)));

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = auth_service();
        let mut session = Session::anonymous();
        auth.register(&mut session, register_input("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        let mut second = Session::anonymous();
        let err = auth
            .register(&mut second, register_input("alice2", "alice@x.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(!second.is_authenticated());
    }
}
