mod redis_cache;

pub use redis_cache::RedisFeedCache;

use crate::error::AgendaResult;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Prefix of every cached feed key
pub const FEED_KEY_PREFIX: &str = "ics_feed_";

/// Short-lived storage for raw feed bodies
#[async_trait]
pub trait FeedCache: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Cached body, if present and not expired
    async fn get(&self, key: &str) -> AgendaResult<Option<String>>;

    /// Store a body for `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AgendaResult<()>;
}

/// Cache that never holds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl FeedCache for NoCache {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn get(&self, _key: &str) -> AgendaResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AgendaResult<()> {
        Ok(())
    }
}

/// Cache key for a feed location
pub fn feed_key(location: &str) -> String {
    let digest = Sha256::digest(location.as_bytes());
    format!("{}{}", FEED_KEY_PREFIX, hex::encode(digest))
}
