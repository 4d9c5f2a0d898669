use async_trait::async_trait;
use ecran_agenda::components::feed_cache::FeedCache;
use ecran_agenda::error::{cache_error, AgendaResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A small timetable feed in the shape ADE exports
#[allow(dead_code)]
pub const DEPARTMENT_FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//ADE//Planning//FR\r\n\
X-WR-CALNAME:Département Informatique\r\n\
BEGIN:VEVENT\r\n\
UID:exam-week\r\n\
DTSTART;VALUE=DATE:20250105\r\n\
DTEND;VALUE=DATE:20250107\r\n\
SUMMARY:Semaine d'examens\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:lecture\r\n\
DTSTART:20250106T080000Z\r\n\
DTEND:20250106T100000Z\r\n\
SUMMARY:Algorithmique\r\n\
LOCATION:Amphi A\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:old\r\n\
DTSTART:20241215T080000Z\r\n\
DTEND:20241215T100000Z\r\n\
SUMMARY:Hors fenêtre\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// In-memory stand-in for the Redis feed cache
#[derive(Debug, Clone, Default)]
pub struct MockFeedCache {
    data: Arc<Mutex<HashMap<String, (String, Duration)>>>,
    broken: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockFeedCache {
    /// Create a new mock cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail, as an unreachable server would
    pub fn break_connection(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// TTL a key was stored with
    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.data.lock().await.get(key).map(|(_, ttl)| *ttl)
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }

    /// Seed a body directly
    pub async fn insert(&self, key: &str, body: &str) {
        self.data
            .lock()
            .await
            .insert(key.to_string(), (body.to_string(), Duration::from_secs(600)));
    }
}

#[async_trait]
impl FeedCache for MockFeedCache {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get(&self, key: &str) -> AgendaResult<Option<String>> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(cache_error("connection refused"));
        }
        Ok(self.data.lock().await.get(key).map(|(body, _)| body.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AgendaResult<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(cache_error("connection refused"));
        }
        self.data
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }
}
