//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Key-value store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Database configuration (used by the `database` store backend).
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Redis configuration (used by the `redis` store backend).
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    /// Site configuration.
    #[serde(default)]
    pub site: SiteConfig,
    /// Default administrator seeded into an admin-less directory.
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Which key-value backend holds the collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map, lost on exit.
    Memory,
    /// One JSON file per key under [`StoreConfig::path`].
    #[default]
    File,
    /// Redis via the `redis` section.
    Redis,
    /// SQL table via the `database` section.
    Database,
}

/// Key-value store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Directory for the file backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

/// Site configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Hostname the visitor counter is keyed by.
    #[serde(default = "default_hostname")]
    pub hostname: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
        }
    }
}

/// Default administrator account.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Username of the seeded admin.
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Email of the seeded admin.
    #[serde(default = "default_admin_email")]
    pub email: String,
    /// Initial password of the seeded admin.
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            email: default_admin_email(),
            password: default_admin_password(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data")
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

fn default_redis_prefix() -> String {
    "comicshelf".to_string()
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@admin.com".to_string()
}

fn default_admin_password() -> String {
    "admin".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            database: None,
            redis: None,
            site: SiteConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `COMICSHELF_ENV`)
    /// 3. Environment variables with `COMICSHELF__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("COMICSHELF_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COMICSHELF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("COMICSHELF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.path, PathBuf::from("./data"));
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.email, "admin@admin.com");
        assert_eq!(config.site.hostname, "localhost");
        assert!(config.database.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[store]
backend = "redis"

[redis]
url = "redis://127.0.0.1:6379"

[site]
hostname = "comics.example"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Redis);
        let redis = config.redis.unwrap();
        assert_eq!(redis.url, "redis://127.0.0.1:6379");
        assert_eq!(redis.prefix, "comicshelf");
        assert_eq!(config.site.hostname, "comics.example");
        assert_eq!(config.admin.password, "admin");
    }
}
