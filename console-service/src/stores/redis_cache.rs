//! Redis cache store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tokio::sync::RwLock;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};

use super::CacheStore;

/// Cache store over a lazily established `ConnectionManager`.
///
/// The manager is created on first successful use and then reused; it
/// reconnects on its own after transient failures.
pub struct RedisCache {
    client: redis::Client,
    timeout: Duration,
    manager: RwLock<Option<ConnectionManager>>,
}

impl RedisCache {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = redis::Client::open(config.cache.connection_url())
            .map_err(|e| AppError::CacheUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(config.connect_timeout_secs),
            manager: RwLock::new(None),
        })
    }

    async fn connection(&self) -> AppResult<ConnectionManager> {
        if let Some(manager) = self.manager.read().await.as_ref() {
            return Ok(manager.clone());
        }

        let mut slot = self.manager.write().await;
        if let Some(manager) = slot.as_ref() {
            return Ok(manager.clone());
        }

        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(self.timeout)
            .set_response_timeout(self.timeout);
        let manager = ConnectionManager::new_with_config(self.client.clone(), manager_config)
            .await
            .map_err(|e| AppError::CacheUnavailable(e.to_string()))?;

        tracing::info!("cache connection established");
        *slot = Some(manager.clone());
        Ok(manager)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| AppError::CacheUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> AppResult<Vec<Vec<u8>>> {
        let mut conn = self.connection().await?;
        redis::cmd("KEYS")
            .arg(pattern)
            .query_async::<Vec<Vec<u8>>>(&mut conn)
            .await
            .map_err(|e| AppError::CacheOperation(e.to_string()))
    }

    async fn get(&self, key: &[u8]) -> AppResult<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key)
            .query_async::<Option<Vec<u8>>>(&mut conn)
            .await
            .map_err(|e| AppError::CacheOperation(e.to_string()))
    }
}
