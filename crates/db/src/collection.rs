//! Whole-collection JSON persistence.
//!
//! A collection is one JSON array stored under one key. Every mutation loads
//! the full array, changes it in memory and writes the full array back; two
//! concurrent writers can lose updates.

use std::marker::PhantomData;

use comicshelf_common::{AppResult, SharedKv};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, warn};

/// Typed view of a JSON array stored under a single key.
pub struct JsonCollection<T> {
    store: SharedKv,
    key: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a collection stored under `key`.
    pub fn new(store: SharedKv, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _record: PhantomData,
        }
    }

    /// Storage key of this collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the collection. A missing key is an empty collection.
    pub async fn try_load(&self) -> AppResult<Vec<T>> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the stored collection with `items`.
    pub async fn try_save(&self, items: &[T]) -> AppResult<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set(&self.key, &raw).await
    }

    /// Load the collection, treating unreadable data as empty.
    pub async fn load(&self) -> Vec<T> {
        match self.try_load().await {
            Ok(items) => items,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load collection, using empty");
                Vec::new()
            }
        }
    }

    /// Save the collection. Failures are logged and dropped.
    pub async fn save(&self, items: &[T]) {
        if let Err(e) = self.try_save(items).await {
            error!(key = %self.key, count = items.len(), error = %e, "Failed to save collection");
        }
    }
}
