//! Redis key-value backend.
//!
//! Keys are namespaced as `<prefix>:<key>` so several sites can share one
//! Redis instance. Values never expire.

use std::sync::Arc;

use fred::clients::Client as RedisClient;
use fred::interfaces::{ClientLike, KeysInterface};
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::kv::KvStore;
use crate::{AppError, AppResult};

/// Key-value store backed by Redis strings.
#[derive(Clone)]
pub struct RedisKv {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisKv {
    /// Wrap an already connected client.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    /// Connect to the Redis instance described by `config`.
    pub async fn connect(config: &RedisConfig) -> AppResult<Self> {
        let fred_config = fred::types::config::Config::from_url(&config.url)
            .map_err(|e| AppError::Config(format!("Invalid Redis URL: {e}")))?;
        let client = RedisClient::new(fred_config, None, None, None);
        client.connect();
        client
            .wait_for_connect()
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        info!(prefix = %config.prefix, "Connected to Redis key-value store");
        Ok(Self::new(Arc::new(client), config.prefix.clone()))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }
}

#[async_trait::async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value: Option<String> = self
            .redis
            .get(self.full_key(key))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(key = %key, hit = value.is_some(), "Redis get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.redis
            .set::<(), _, _>(self.full_key(key), value.to_string(), None, None, false)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let _: i64 = self
            .redis
            .del(self.full_key(key))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_key() {
        let client = RedisClient::new(fred::types::config::Config::default(), None, None, None);
        let kv = RedisKv::new(Arc::new(client), "comicshelf");
        assert_eq!(kv.full_key("users"), "comicshelf:users");
        assert_eq!(
            kv.full_key("visitorCount_localhost"),
            "comicshelf:visitorCount_localhost"
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let config = RedisConfig {
            url: "not a url".to_string(),
            prefix: "comicshelf".to_string(),
        };
        let err = RedisKv::connect(&config).await.err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }
}
