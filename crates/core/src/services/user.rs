//! User directory service.

use chrono::Utc;
use comicshelf_common::config::AdminConfig;
use comicshelf_common::{
    AppError, AppResult, IdGenerator, hash_password, is_password_hash, verify_password,
};
use comicshelf_db::entities::{SessionUser, User, UserRole};
use comicshelf_db::repositories::UserRepository;
use tracing::{error, info, warn};

/// ID of the administrator seeded into an admin-less directory.
pub const DEFAULT_ADMIN_ID: &str = "admin-default";

/// Account directory: lookup, registration and credential checks.
#[derive(Clone)]
pub struct UserDirectory {
    user_repo: UserRepository,
    default_admin: AdminConfig,
    id_gen: IdGenerator,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    pub role: UserRole,
}

impl UserDirectory {
    /// Create a new user directory.
    #[must_use]
    pub const fn new(user_repo: UserRepository, default_admin: AdminConfig) -> Self {
        Self {
            user_repo,
            default_admin,
            id_gen: IdGenerator::new(),
        }
    }

    /// Load every account, seeding the default administrator when the
    /// directory holds no admin.
    ///
    /// An unreadable collection yields an empty list and is left untouched.
    pub async fn load(&self) -> Vec<User> {
        self.try_load().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to load users");
            Vec::new()
        })
    }

    /// Like [`Self::load`], but surfaces read failures. Seeding only happens
    /// after a successful read.
    pub async fn try_load(&self) -> AppResult<Vec<User>> {
        let mut users = self.user_repo.try_find_all().await?;
        if users.iter().any(User::is_admin) {
            return Ok(users);
        }

        match self.default_admin_record() {
            Ok(admin) => {
                info!(username = %admin.username, "Seeding default administrator");
                users.push(admin);
                self.user_repo.save_all(&users).await;
            }
            Err(e) => error!(error = %e, "Failed to seed default administrator"),
        }
        Ok(users)
    }

    fn default_admin_record(&self) -> AppResult<User> {
        Ok(User {
            id: DEFAULT_ADMIN_ID.to_string(),
            username: self.default_admin.username.clone(),
            email: self.default_admin.email.clone(),
            password: hash_password(&self.default_admin.password)?,
            role: UserRole::Admin,
            created_at: Utc::now(),
        })
    }

    /// Find an account by email (exact, case-sensitive).
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        self.load().await.into_iter().find(|u| u.email == email)
    }

    /// Find an account by username (exact, case-sensitive).
    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        self.load().await.into_iter().find(|u| u.username == username)
    }

    /// All administrator accounts.
    pub async fn admins(&self) -> Vec<User> {
        self.load().await.into_iter().filter(User::is_admin).collect()
    }

    /// Create an account. Email and username must both be unused.
    ///
    /// Fails without writing when the stored collection cannot be read.
    pub async fn create_user(&self, input: NewUser) -> AppResult<User> {
        let mut users = self.try_load().await?;

        if users.iter().any(|u| u.email == input.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if users.iter().any(|u| u.username == input.username) {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let user = User {
            id: self.id_gen.generate(),
            username: input.username,
            email: input.email,
            password: hash_password(&input.password)?,
            role: input.role,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        self.user_repo.save_all(&users).await;

        info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    /// Check credentials. `identifier` is matched against emails first and
    /// usernames second.
    ///
    /// A record still holding a plaintext password is accepted on exact
    /// match and rehashed in place.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> AppResult<SessionUser> {
        let mut users = self.load().await;

        let idx = users
            .iter()
            .position(|u| u.email == identifier)
            .or_else(|| users.iter().position(|u| u.username == identifier))
            .ok_or(AppError::Unauthorized)?;

        let stored = &users[idx].password;
        if is_password_hash(stored) {
            if !verify_password(password, stored).unwrap_or(false) {
                return Err(AppError::Unauthorized);
            }
        } else {
            if stored != password {
                return Err(AppError::Unauthorized);
            }
            match hash_password(password) {
                Ok(hash) => {
                    users[idx].password = hash;
                    self.user_repo.save_all(&users).await;
                    info!(user_id = %users[idx].id, "Upgraded plaintext credential");
                }
                Err(e) => warn!(user_id = %users[idx].id, error = %e, "Failed to upgrade credential"),
            }
        }

        Ok(users.swap_remove(idx).into())
    }
}
