use crate::components::feed_cache::{feed_key, FeedCache};
use crate::error::{fetch_error, AgendaResult};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Where a feed is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote(Url),
    Local(PathBuf),
}

impl FeedSource {
    /// Classify a feed location: http(s) URLs are remote, file URLs and plain paths are local
    pub fn from_location(location: &str) -> Option<Self> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }

        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(FeedSource::Remote(url)),
            Ok(url) if url.scheme() == "file" => url.to_file_path().ok().map(FeedSource::Local),
            Ok(url) => {
                warn!("Unsupported feed scheme {}", url.scheme());
                None
            }
            Err(_) => Some(FeedSource::Local(PathBuf::from(location))),
        }
    }
}

/// Retrieves raw ICS text, going through the feed cache and the local fallback copies
#[derive(Clone)]
pub struct CalendarFetcher {
    client: Client,
    cache: Arc<dyn FeedCache>,
    ttl: Duration,
    fallback_dir: Option<PathBuf>,
}

impl CalendarFetcher {
    pub fn new(cache: Arc<dyn FeedCache>, ttl: Duration, fallback_dir: Option<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            cache,
            ttl,
            fallback_dir,
        }
    }

    /// Feed body for a calendar code, or None when nothing could be read
    pub async fn fetch(&self, code: &str, location: &str) -> Option<String> {
        let key = feed_key(location);

        match self.cache.get(&key).await {
            Ok(Some(body)) if !body.trim().is_empty() => {
                debug!("Feed cache hit for calendar {}", code);
                return Some(body);
            }
            Ok(_) => debug!("Feed cache miss for calendar {}", code),
            Err(e) => debug!("Feed cache {} unavailable: {}", self.cache.name(), e),
        }

        let source = FeedSource::from_location(location);
        let fetched = match &source {
            Some(source) => self.read_source(source).await,
            None => Err(fetch_error(&format!("no usable feed location {:?}", location))),
        };

        match fetched {
            Ok(body) if !body.trim().is_empty() => {
                info!("Fetched feed for calendar {} ({} bytes)", code, body.len());
                self.remember(code, &key, &body, source.as_ref()).await;
                return Some(body);
            }
            Ok(_) => warn!("Feed for calendar {} is empty", code),
            Err(e) => warn!("Failed to fetch feed for calendar {}: {}", code, e),
        }

        self.read_fallback(code).await
    }

    async fn read_source(&self, source: &FeedSource) -> AgendaResult<String> {
        match source {
            FeedSource::Remote(url) => {
                let response = self.client.get(url.clone()).send().await?;

                if !response.status().is_success() {
                    return Err(fetch_error(&format!("HTTP {} from {}", response.status(), url)));
                }

                Ok(response.text().await?)
            }
            FeedSource::Local(path) => Ok(tokio::fs::read_to_string(path).await?),
        }
    }

    async fn remember(&self, code: &str, key: &str, body: &str, source: Option<&FeedSource>) {
        if let Err(e) = self.cache.set(key, body, self.ttl).await {
            debug!("Could not cache feed for calendar {}: {}", code, e);
        }

        if !matches!(source, Some(FeedSource::Remote(_))) {
            return;
        }
        let Some(path) = self.fallback_path(code) else {
            return;
        };
        if let Err(e) = write_copy(&path, body).await {
            warn!("Could not keep a local copy of calendar {} at {}: {}", code, path.display(), e);
        }
    }

    async fn read_fallback(&self, code: &str) -> Option<String> {
        let path = self.fallback_path(code)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(body) if !body.trim().is_empty() => {
                info!("Using local copy of calendar {} from {}", code, path.display());
                Some(body)
            }
            Ok(_) | Err(_) => {
                warn!("No usable local copy for calendar {}", code);
                None
            }
        }
    }

    /// Local copy location for a calendar code
    pub fn fallback_path(&self, code: &str) -> Option<PathBuf> {
        let dir = self.fallback_dir.as_ref()?;
        let safe: String = code
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if safe.is_empty() {
            return None;
        }
        Some(dir.join(format!("{}.ics", safe)))
    }
}

async fn write_copy(path: &Path, body: &str) -> AgendaResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await?;
    Ok(())
}
