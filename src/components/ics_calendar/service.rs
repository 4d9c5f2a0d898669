use super::expander::{expand, ExpandOptions};
use super::fetcher::CalendarFetcher;
use super::models::{ParsedCalendar, ScheduleResult};
use super::parser::parse_calendar;
use super::time::SiteSettings;
use crate::components::feed_cache::{FeedCache, NoCache, RedisFeedCache};
use crate::config::Config;
use crate::error::AgendaResult;
use crate::utils::weekdays::{rotated_week, Weekday};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

/// Per-request entry point: fetch, parse and expand one calendar
#[derive(Clone)]
pub struct AgendaService {
    config: Arc<Config>,
    fetcher: CalendarFetcher,
}

impl AgendaService {
    /// Create a service around an explicit cache
    pub fn new(config: Config, cache: Arc<dyn FeedCache>) -> Self {
        let fetcher = CalendarFetcher::new(
            cache,
            StdDuration::from_secs(config.cache_ttl),
            config.feed_dir.clone(),
        );
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    /// Create a service, using Redis when the configuration names a server
    pub fn from_config(config: Config) -> AgendaResult<Self> {
        let cache: Arc<dyn FeedCache> = match config.redis_url.as_deref() {
            Some(url) => Arc::new(RedisFeedCache::new(url)?),
            None => Arc::new(NoCache),
        };
        info!("Agenda service using {} feed cache", cache.name());
        Ok(Self::new(config, cache))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Today's date on the site clock
    pub fn site_today(&self) -> NaiveDate {
        (Utc::now().naive_utc() + Duration::seconds(i64::from(self.config.gmt_offset))).date()
    }

    /// Expansion options for a calendar, with its overrides applied
    pub fn options_for(&self, code: &str, today: NaiveDate) -> ExpandOptions {
        let overrides = self.config.calendar(code);
        ExpandOptions {
            window_start: overrides
                .first_date
                .or(self.config.first_date)
                .unwrap_or(today),
            limit_days: overrides.limit_days.unwrap_or(self.config.limit_days),
            title: overrides.title.or_else(|| self.config.title.clone()),
            description: overrides
                .description
                .or_else(|| self.config.description.clone()),
            site: SiteSettings {
                gmt_offset: self.config.gmt_offset,
                time_format: self.config.time_format.clone(),
                start_of_week: self.config.start_of_week,
                legacy_end_time: self.config.legacy_end_time,
            },
        }
    }

    /// Fetch and parse a calendar without expanding it
    pub async fn calendar(&self, code: &str) -> ParsedCalendar {
        let location = self.config.feed_location(code);
        match self.fetcher.fetch(code, &location).await {
            Some(body) => parse_calendar(&body),
            None => {
                warn!("No events for calendar {}", code);
                ParsedCalendar::default()
            }
        }
    }

    /// Schedule for a calendar with the window anchored on `today`
    pub async fn schedule(&self, code: &str, today: NaiveDate) -> ScheduleResult {
        let options = self.options_for(code, today);
        let calendar = self.calendar(code).await;
        let result = expand(calendar, &options);
        info!(
            "Calendar {}: {} occurrences between {} and {}",
            code,
            result.occurrence_count(),
            options.window_start,
            options.window_end()
        );
        result
    }

    /// Schedule for a calendar with the window anchored on the site's today
    pub async fn schedule_today(&self, code: &str) -> ScheduleResult {
        self.schedule(code, self.site_today()).await
    }

    /// Weekday names in display order
    pub fn weekdays(&self) -> Vec<Weekday> {
        rotated_week(&self.config.locale, self.config.start_of_week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalendarOverrides;

    fn service() -> AgendaService {
        let mut config = Config {
            feed_url: "/srv/ics/{code}.ics".to_string(),
            title: Some("none".to_string()),
            limit_days: 30,
            ..Config::default()
        };
        config.calendars.insert(
            "8382".to_string(),
            CalendarOverrides {
                title: Some("Amphi A".to_string()),
                first_date: NaiveDate::from_ymd_opt(2025, 2, 1),
                limit_days: Some(7),
                ..CalendarOverrides::default()
            },
        );
        AgendaService::new(config, Arc::new(NoCache))
    }

    #[test]
    fn test_options_fall_back_to_site_config() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let options = service().options_for("1111", today);

        assert_eq!(options.window_start, today);
        assert_eq!(options.limit_days, 30);
        assert_eq!(options.title.as_deref(), Some("none"));
        assert_eq!(options.site.time_format, "%H:%M");
    }

    #[test]
    fn test_options_apply_calendar_overrides() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let options = service().options_for("8382", today);

        assert_eq!(options.window_start, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(options.limit_days, 7);
        assert_eq!(options.title.as_deref(), Some("Amphi A"));
        assert_eq!(options.window_end(), NaiveDate::from_ymd_opt(2025, 2, 8).unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_feed_gives_empty_schedule() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let result = service().schedule("1111", today).await;

        assert!(result.events.is_empty());
        assert!(result.earliest.is_none());
        assert!(result.latest.is_none());
    }

    #[test]
    fn test_from_config_without_redis() {
        let config = Config {
            feed_url: "/srv/ics/{code}.ics".to_string(),
            ..Config::default()
        };
        assert!(AgendaService::from_config(config).is_ok());
    }
}
