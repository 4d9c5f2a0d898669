use crate::error::{config_error, env_error, AgendaResult};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Number of days kept after the window start
pub const DEFAULT_LIMIT_DAYS: i64 = 365;
/// Lifetime of a cached feed body, in seconds
pub const DEFAULT_CACHE_TTL: u64 = 600;
/// Display format for times of day
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";
/// Locale used for weekday names
pub const DEFAULT_LOCALE: &str = "en";
/// Per-calendar overrides file
pub const CALENDARS_FILE: &str = "config/calendars.toml";

/// Agenda configuration, as the hosting site exposes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feed URL or path template, `{code}` is replaced by the calendar code
    pub feed_url: String,
    /// Directory holding the last good copy of each feed
    pub feed_dir: Option<PathBuf>,
    /// Site offset from UTC, in seconds
    pub gmt_offset: i32,
    /// strftime pattern used for displayed times
    pub time_format: String,
    /// First day of the week, 0 = Sunday
    pub start_of_week: u8,
    /// Locale for weekday names
    pub locale: String,
    /// Length of the display window in days
    pub limit_days: i64,
    /// Fixed window start, today when unset
    pub first_date: Option<NaiveDate>,
    /// Title override, `"none"` hides the title
    pub title: Option<String>,
    /// Description override, `"none"` hides the description
    pub description: Option<String>,
    /// Format same-day end times from the end date alone
    pub legacy_end_time: bool,
    /// Redis connection string, caching is off when unset
    pub redis_url: Option<String>,
    /// Cache lifetime in seconds
    pub cache_ttl: u64,
    /// Overrides keyed by calendar code
    pub calendars: HashMap<String, CalendarOverrides>,
}

/// Settings a single calendar code may override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarOverrides {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub limit_days: Option<i64>,
    pub first_date: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            feed_dir: None,
            gmt_offset: 0,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            start_of_week: 1,
            locale: DEFAULT_LOCALE.to_string(),
            limit_days: DEFAULT_LIMIT_DAYS,
            first_date: None,
            title: None,
            description: None,
            legacy_end_time: true,
            redis_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            calendars: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment and the calendars file
    pub fn load() -> AgendaResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.merge_calendars_file(Path::new(CALENDARS_FILE))?;
        Ok(config)
    }

    /// Build a configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> AgendaResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feed_url = lookup("AGENDA_FEED_URL").ok_or_else(|| env_error("AGENDA_FEED_URL"))?;
        let defaults = Self::default();

        let config = Config {
            feed_url,
            feed_dir: lookup("AGENDA_FEED_DIR").map(PathBuf::from),
            gmt_offset: parse_var(&lookup, "AGENDA_GMT_OFFSET")?.unwrap_or(defaults.gmt_offset),
            time_format: lookup("AGENDA_TIME_FORMAT").unwrap_or(defaults.time_format),
            start_of_week: parse_var(&lookup, "AGENDA_START_OF_WEEK")?
                .unwrap_or(defaults.start_of_week),
            locale: lookup("AGENDA_LOCALE").unwrap_or(defaults.locale),
            limit_days: parse_var(&lookup, "AGENDA_LIMIT_DAYS")?.unwrap_or(defaults.limit_days),
            first_date: parse_var(&lookup, "AGENDA_FIRST_DATE")?,
            title: lookup("AGENDA_TITLE"),
            description: lookup("AGENDA_DESCRIPTION"),
            legacy_end_time: parse_var(&lookup, "AGENDA_LEGACY_END_TIME")?
                .unwrap_or(defaults.legacy_end_time),
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            cache_ttl: parse_var(&lookup, "AGENDA_CACHE_TTL")?.unwrap_or(defaults.cache_ttl),
            calendars: HashMap::new(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Merge per-calendar overrides from a TOML file, if it exists
    pub fn merge_calendars_file(&mut self, path: &Path) -> AgendaResult<()> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No calendars file at {}: {}", path.display(), e);
                return Ok(());
            }
        };

        let file_calendars = toml::from_str::<HashMap<String, CalendarOverrides>>(&content)?;
        for (code, overrides) in file_calendars {
            if let Some(limit) = overrides.limit_days {
                if limit < 0 {
                    return Err(config_error(&format!(
                        "limit_days for calendar {} must not be negative",
                        code
                    )));
                }
            }
            self.calendars.insert(code, overrides);
        }

        Ok(())
    }

    /// Overrides for one calendar code, empty when none are configured
    pub fn calendar(&self, code: &str) -> CalendarOverrides {
        self.calendars.get(code).cloned().unwrap_or_default()
    }

    /// Feed location for a calendar code
    pub fn feed_location(&self, code: &str) -> String {
        let template = self
            .calendars
            .get(code)
            .and_then(|c| c.url.as_deref())
            .unwrap_or(&self.feed_url);
        template.replace("{code}", code)
    }

    fn validate(&self) -> AgendaResult<()> {
        if self.start_of_week > 6 {
            return Err(config_error(&format!(
                "start of week must be between 0 and 6, got {}",
                self.start_of_week
            )));
        }
        if self.limit_days < 0 {
            return Err(config_error("limit_days must not be negative"));
        }
        if !is_valid_time_format(&self.time_format) {
            return Err(config_error(&format!(
                "invalid time format: {}",
                self.time_format
            )));
        }
        if self.feed_url.is_empty() {
            warn!("AGENDA_FEED_URL is empty, every fetch will fall back to local copies");
        }
        Ok(())
    }
}

/// Check that a strftime pattern has no unknown specifiers
pub fn is_valid_time_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn parse_var<F, T>(lookup: &F, key: &str) -> AgendaResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| config_error(&format!("{} has an invalid value: {}", key, raw))),
        None => Ok(None),
    }
}
