use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A DTSTART/DTEND value as written in the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// `VALUE=DATE`, no time of day
    Date(NaiveDate),
    /// Trailing `Z`
    Utc(NaiveDateTime),
    /// Wall time with a `TZID` parameter
    Zoned { datetime: NaiveDateTime, tzid: String },
    /// Wall time with no zone information
    Floating(NaiveDateTime),
}

/// One VEVENT as the parser hands it over
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    /// DTSTART value, verbatim
    pub start_raw: String,
    /// DTEND value, verbatim
    pub end_raw: String,
    pub summary: String,
    pub description: String,
    pub location: String,
}

/// Calendar-level data plus its events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCalendar {
    pub name: String,
    pub description: String,
    pub events: Vec<RawEvent>,
}

/// Position of an occurrence within its day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    AllDay,
    Timed(NaiveTime),
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::AllDay => write!(f, "all-day"),
            SlotKey::Timed(time) => write!(f, "t{}", time.format("%H%M%S")),
        }
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One calendar-day instance of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedOccurrence {
    pub label: String,
    pub description: String,
    pub location: String,
    pub start_raw: String,
    pub end_raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_end: Option<String>,
}

pub type DayBucket = BTreeMap<SlotKey, Vec<ExpandedOccurrence>>;

/// year -> month -> day -> slots
pub type EventTree = BTreeMap<i32, BTreeMap<u32, BTreeMap<u32, DayBucket>>>;

/// Title or description shown above the schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heading {
    Text(String),
    Suppressed,
}

impl Heading {
    /// Apply an override on top of the parsed value
    pub fn resolve(parsed: &str, override_value: Option<&str>) -> Self {
        match override_value {
            Some("none") => Heading::Suppressed,
            Some(text) => Heading::Text(text.to_string()),
            None => Heading::Text(parsed.to_string()),
        }
    }
}

impl Serialize for Heading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Heading::Text(text) => serializer.serialize_str(text),
            Heading::Suppressed => serializer.serialize_bool(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Expanded schedule handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
    pub title: Heading,
    pub description: Heading,
    pub events: EventTree,
    pub earliest: Option<YearMonth>,
    pub latest: Option<YearMonth>,
}

impl ScheduleResult {
    /// Slots for one date, if the date is in the schedule
    pub fn day(&self, date: NaiveDate) -> Option<&DayBucket> {
        use chrono::Datelike;
        self.events
            .get(&date.year())?
            .get(&date.month())?
            .get(&date.day())
    }

    /// Number of occurrences across all days
    pub fn occurrence_count(&self) -> usize {
        self.events
            .values()
            .flat_map(|months| months.values())
            .flat_map(|days| days.values())
            .flat_map(|slots| slots.values())
            .map(Vec::len)
            .sum()
    }
}
