//! Redis-backed destination cache.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

const KEY_PREFIX: &str = "linkup:dest:";

/// Redis cache for the redirect hot path.
///
/// Uses a `ConnectionManager`, which reconnects transparently; clones share
/// one multiplexed connection.
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// `default_ttl_seconds` comes from `CACHE_TTL_SECONDS`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            conn: manager,
            default_ttl: default_ttl_seconds,
        })
    }

    fn key(path: &str) -> String {
        format!("{}{}", KEY_PREFIX, path)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_destination(&self, path: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();

        let cached = conn
            .get::<_, Option<String>>(Self::key(path))
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", path, e)))?;

        match &cached {
            Some(_) => debug!(path, "Cache HIT"),
            None => debug!(path, "Cache MISS"),
        }

        Ok(cached)
    }

    async fn set_destination(
        &self,
        path: &str,
        destination: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        conn.set_ex::<_, _, ()>(Self::key(path), destination, ttl)
            .await
            .map_err(|e| CacheError::OperationError(format!("SETEX {}: {}", path, e)))?;

        debug!(path, ttl, "Cache SET");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
