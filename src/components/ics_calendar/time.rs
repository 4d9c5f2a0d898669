use super::models::EventTime;
use chrono::{Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use std::fmt::Write;
use tracing::debug;

/// Site-wide display settings consumed during expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    /// Offset from UTC in seconds
    pub gmt_offset: i32,
    /// strftime pattern for times of day
    pub time_format: String,
    /// First day of the week, 0 = Sunday
    pub start_of_week: u8,
    /// Format same-day end times from the end date alone
    pub legacy_end_time: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            gmt_offset: 0,
            time_format: crate::config::DEFAULT_TIME_FORMAT.to_string(),
            start_of_week: 1,
            legacy_end_time: true,
        }
    }
}

/// An event boundary in site-local terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalStamp {
    pub date: NaiveDate,
    /// None for date-only values
    pub time: Option<NaiveTime>,
}

impl LocalStamp {
    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }
}

/// Resolve a feed value into the site's local date and time
pub fn resolve_local(value: &EventTime, site: &SiteSettings) -> LocalStamp {
    match value {
        EventTime::Date(date) => LocalStamp {
            date: *date,
            time: None,
        },
        EventTime::Utc(utc) => stamp(shift_to_site(*utc, site)),
        EventTime::Zoned { datetime, tzid } => match tzid.parse::<Tz>() {
            Ok(tz) => match zoned_to_utc(*datetime, tz) {
                Some(utc) => stamp(shift_to_site(utc, site)),
                None => {
                    debug!("Local time {} does not exist in {}, using it as written", datetime, tzid);
                    stamp(*datetime)
                }
            },
            Err(_) => {
                debug!("Unknown TZID {}, using wall time as written", tzid);
                stamp(*datetime)
            }
        },
        EventTime::Floating(datetime) => stamp(*datetime),
    }
}

fn stamp(datetime: NaiveDateTime) -> LocalStamp {
    LocalStamp {
        date: datetime.date(),
        time: Some(datetime.time()),
    }
}

fn shift_to_site(utc: NaiveDateTime, site: &SiteSettings) -> NaiveDateTime {
    utc.checked_add_signed(Duration::seconds(i64::from(site.gmt_offset)))
        .unwrap_or(utc)
}

fn zoned_to_utc(datetime: NaiveDateTime, tz: Tz) -> Option<NaiveDateTime> {
    match tz.from_local_datetime(&datetime) {
        LocalResult::Single(dt) => Some(dt.naive_utc()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.naive_utc()),
        LocalResult::None => None,
    }
}

/// Format a time of day with the site pattern, empty on a bad pattern
pub fn format_time(date: NaiveDate, time: NaiveTime, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.and_time(time).format(format)).is_err() {
        debug!("Time format {:?} could not be applied", format);
        out.clear();
    }
    out
}
