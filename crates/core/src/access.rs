//! Access checks for gated operations.

use comicshelf_common::{AppError, AppResult};
use comicshelf_db::entities::{Comic, SessionUser};

use crate::services::Session;

/// The signed-in identity, or `Unauthorized`.
pub fn require_user(session: &Session) -> AppResult<&SessionUser> {
    session.current().ok_or(AppError::Unauthorized)
}

/// The signed-in administrator. Signed-out sessions get `Unauthorized`,
/// other users `Forbidden`.
pub fn require_admin(session: &Session) -> AppResult<&SessionUser> {
    let user = require_user(session)?;
    if !user.is_admin() {
        return Err(AppError::Forbidden("administrator only".to_string()));
    }
    Ok(user)
}

/// Whether `user` may edit or delete `comic`: administrators always, other
/// users only their own submissions.
#[must_use]
pub fn can_modify_comic(user: &SessionUser, comic: &Comic) -> bool {
    user.is_admin() || comic.author_id.as_deref() == Some(user.id.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comicshelf_db::entities::{ComicStatus, UserRole};

    fn user(id: &str, role: UserRole) -> SessionUser {
        SessionUser {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@x.com"),
            role,
            created_at: Utc::now(),
        }
    }

    fn comic(author_id: Option<&str>) -> Comic {
        Comic {
            id: "c1".to_string(),
            title: "T".to_string(),
            description: String::new(),
            images: vec!["p".to_string()],
            created_at: Utc::now(),
            author_id: author_id.map(str::to_string),
            status: ComicStatus::Pending,
        }
    }

    #[test]
    fn test_require_user() {
        assert!(matches!(
            require_user(&Session::anonymous()).unwrap_err(),
            AppError::Unauthorized
        ));
        let session = Session::signed_in(user("u1", UserRole::User));
        assert_eq!(require_user(&session).unwrap().id, "u1");
    }

    #[test]
    fn test_require_admin() {
        assert!(matches!(
            require_admin(&Session::anonymous()).unwrap_err(),
            AppError::Unauthorized
        ));
        assert!(matches!(
            require_admin(&Session::signed_in(user("u1", UserRole::User))).unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(require_admin(&Session::signed_in(user("a", UserRole::Admin))).is_ok());
    }

    #[test]
    fn test_can_modify_comic() {
        let owner = user("u1", UserRole::User);
        let stranger = user("u2", UserRole::User);
        let admin = user("a", UserRole::Admin);

        assert!(can_modify_comic(&owner, &comic(Some("u1"))));
        assert!(!can_modify_comic(&stranger, &comic(Some("u1"))));
        assert!(!can_modify_comic(&owner, &comic(None)));
        assert!(can_modify_comic(&admin, &comic(None)));
    }
}
