//! Storage layer for comicshelf.
//!
//! Domain records live as JSON collections inside a key-value store. This
//! crate defines the records, the SQL-backed store and one repository per
//! collection, and opens whichever backend the configuration selects.

pub mod collection;
pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod store;
pub mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use comicshelf_common::config::{DatabaseConfig, StoreBackend};
use comicshelf_common::{AppError, Config, FileKv, MemoryKv, RedisKv, SharedKv};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;
use tracing::log::LevelFilter;

pub use collection::JsonCollection;
pub use store::SeaOrmKv;

/// Initialize database connection.
pub async fn init(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.url);

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Open the key-value store selected by `config.store.backend`.
pub async fn open_store(config: &Config) -> Result<SharedKv, AppError> {
    let store: SharedKv = match config.store.backend {
        StoreBackend::Memory => MemoryKv::shared(),
        StoreBackend::File => Arc::new(FileKv::new(config.store.path.clone())),
        StoreBackend::Redis => {
            let redis = config.redis.as_ref().ok_or_else(|| {
                AppError::Config("store.backend is redis but [redis] is missing".to_string())
            })?;
            Arc::new(RedisKv::connect(redis).await?)
        }
        StoreBackend::Database => {
            let database = config.database.as_ref().ok_or_else(|| {
                AppError::Config("store.backend is database but [database] is missing".to_string())
            })?;
            let db = init(database).await?;
            migrate(&db).await?;
            Arc::new(SeaOrmKv::new(Arc::new(db)))
        }
    };

    info!(backend = ?config.store.backend, "Opened key-value store");
    Ok(store)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Memory;

        let store = open_store(&config).await.unwrap();
        store.set("users", "[]").await.unwrap();
        assert_eq!(store.get("users").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.path = dir.path().to_path_buf();

        let store = open_store(&config).await.unwrap();
        store.set("reviews", "[]").await.unwrap();
        assert!(dir.path().join("reviews.json").exists());
    }

    #[tokio::test]
    async fn test_missing_backend_section() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Database;

        let err = open_store(&config).await.err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }
}
