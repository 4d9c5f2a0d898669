use super::FeedCache;
use crate::error::{cache_error, AgendaResult};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};
use std::time::Duration;
use tracing::debug;

/// Feed cache backed by Redis keys with an expiry
pub struct RedisFeedCache {
    client: RedisClient,
}

impl RedisFeedCache {
    /// Create a cache for the given URL. No connection is made until first use
    pub fn new(redis_url: &str) -> AgendaResult<Self> {
        let client = RedisClient::open(redis_url)
            .map_err(|e| cache_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get a redis connection
    async fn connection(&self) -> AgendaResult<MultiplexedConnection> {
        debug!("Opening Redis connection for feed cache");
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| cache_error(&format!("Failed to connect to Redis: {}", e)))
    }
}

#[async_trait]
impl FeedCache for RedisFeedCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> AgendaResult<Option<String>> {
        let mut conn = self.connection().await?;
        let body: Option<String> = conn.get(key).await?;
        Ok(body)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AgendaResult<()> {
        let mut conn = self.connection().await?;
        // Redis rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        () = conn.set_ex(key, value, seconds).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        assert!(RedisFeedCache::new("not a redis url").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_cache_error() {
        // Port 1 is never a Redis server
        let cache = RedisFeedCache::new("redis://127.0.0.1:1").unwrap();
        let result = cache.get("ics_feed_missing").await;
        assert!(matches!(result, Err(crate::error::Error::Cache(_))));
    }
}
