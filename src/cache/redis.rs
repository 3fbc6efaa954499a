//! Redis-backed session cache.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;

use super::SessionCache;

/// Bound every round trip so a slow cache cannot stall request handling.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Session cache backed by Redis.
///
/// `ConnectionManager` multiplexes one connection and reconnects on failure,
/// so the handle is cheap to clone and safe to share across requests.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis and return a shareable cache handle.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed or the initial connection fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).context("invalid redis url")?;
        let config = redis::aio::ConnectionManagerConfig::new()
            .set_response_timeout(RESPONSE_TIMEOUT)
            .set_connection_timeout(CONNECTION_TIMEOUT);
        let manager = ConnectionManager::new_with_config(client, config)
            .await
            .context("failed to connect to redis")?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl SessionCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(key).await.context("redis GET failed")
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.manager.clone();
        // SETEX floors sub-second TTLs; the shortest TTL used anywhere is minutes
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .context("redis SETEX failed")
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await.context("redis DEL failed")
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        // SCAN instead of KEYS: non-blocking on large keyspaces
        let mut conn = self.manager.clone();
        let pattern = format!("{prefix}*");
        let mut iter = conn
            .scan_match::<_, String>(pattern)
            .await
            .context("redis SCAN failed")?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}
