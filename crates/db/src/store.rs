//! SQL-backed key-value store.

use std::sync::Arc;

use chrono::Utc;
use comicshelf_common::{AppError, AppResult, KvStore};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use tracing::debug;

use crate::entities::{KvEntry, kv_entry};

/// Key-value store persisted in the `kv_entry` table.
#[derive(Clone)]
pub struct SeaOrmKv {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmKv {
    /// Create a new store over an open connection.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl KvStore for SeaOrmKv {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entry = KvEntry::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(entry.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let now: DateTimeWithTimeZone = Utc::now().into();

        match KvEntry::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.value = Set(value.to_string());
                active.updated_at = Set(now);
                active
                    .update(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            None => {
                kv_entry::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    updated_at: Set(now),
                }
                .insert(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        debug!(key = %key, bytes = value.len(), "Stored key");
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        KvEntry::delete_by_id(key.to_string())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
