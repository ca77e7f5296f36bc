//! User account record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Stored account, including the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, or plaintext for records that predate hashing.
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authenticated identity without the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl SessionUser {
    /// Whether this identity holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_user_has_no_password() {
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "secret1".to_string(),
            role: UserRole::User,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(SessionUser::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "user");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_parse_stored_user() {
        let user: User = serde_json::from_str(
            r#"{"id":"admin-default","username":"admin","email":"admin@admin.com",
                "password":"admin","role":"admin","createdAt":"2024-03-01T10:00:00.000Z"}"#,
        )
        .unwrap();

        assert!(user.is_admin());
        assert_eq!(user.password, "admin");
    }
}
