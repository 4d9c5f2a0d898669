//! Turns raw feed events into the day-bucketed schedule the screens display.
//!
//! Every event is resolved to site-local dates, split into one occurrence per
//! calendar day it touches, filtered to the display window and regrouped as
//! year -> month -> day -> slot.

use super::models::{
    DayBucket, EventTree, ExpandedOccurrence, Heading, ParsedCalendar, RawEvent, ScheduleResult,
    SlotKey, YearMonth,
};
use super::time::{format_time, resolve_local, LocalStamp, SiteSettings};
use crate::config::DEFAULT_LIMIT_DAYS;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use tracing::debug;

/// Inputs of one expansion besides the events themselves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    /// First date kept in the output
    pub window_start: NaiveDate,
    /// Days kept after `window_start`, inclusive
    pub limit_days: i64,
    /// Title override, `"none"` suppresses
    pub title: Option<String>,
    /// Description override, `"none"` suppresses
    pub description: Option<String>,
    pub site: SiteSettings,
}

impl ExpandOptions {
    pub fn new(window_start: NaiveDate) -> Self {
        Self {
            window_start,
            limit_days: DEFAULT_LIMIT_DAYS,
            title: None,
            description: None,
            site: SiteSettings::default(),
        }
    }

    /// Last date kept in the output
    pub fn window_end(&self) -> NaiveDate {
        self.window_start
            .checked_add_signed(Duration::days(self.limit_days))
            .unwrap_or(NaiveDate::MAX)
    }

    fn in_window(&self, date: NaiveDate) -> bool {
        date >= self.window_start && date <= self.window_end()
    }
}

/// Expand a parsed calendar
pub fn expand(calendar: ParsedCalendar, options: &ExpandOptions) -> ScheduleResult {
    expand_events(&calendar.name, &calendar.description, calendar.events, options)
}

/// Expand a sequence of events under the given calendar name and description
pub fn expand_events<I>(
    name: &str,
    description: &str,
    events: I,
    options: &ExpandOptions,
) -> ScheduleResult
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for event in events {
        place_event(&mut days, event, options);
    }

    let earliest = days.keys().next().map(|d| year_month(*d));
    let latest = days.keys().next_back().map(|d| year_month(*d));

    let mut tree = EventTree::new();
    for (date, bucket) in days {
        tree.entry(date.year())
            .or_default()
            .entry(date.month())
            .or_default()
            .insert(date.day(), bucket);
    }

    ScheduleResult {
        title: Heading::resolve(name, options.title.as_deref()),
        description: Heading::resolve(description, options.description.as_deref()),
        events: tree,
        earliest,
        latest,
    }
}

fn place_event(days: &mut BTreeMap<NaiveDate, DayBucket>, event: RawEvent, options: &ExpandOptions) {
    let site = &options.site;
    let Some(start_value) = event.start.as_ref() else {
        debug!("Skipping event {:?} without a usable start", event.summary);
        return;
    };

    let start = resolve_local(start_value, site);
    let mut end = event
        .end
        .as_ref()
        .map(|value| resolve_local(value, site))
        .unwrap_or(start);
    if end.date < start.date {
        debug!("Event {:?} ends before it starts, keeping its start day", event.summary);
        end = start;
    }
    let all_day = start.is_all_day();

    if start.date == end.date {
        if !options.in_window(start.date) {
            return;
        }
        let (key, formatted_start, formatted_end) = match start.time {
            Some(start_time) if !all_day => (
                SlotKey::Timed(start_time),
                Some(format_time(start.date, start_time, &site.time_format)),
                Some(same_day_end(&end, site)),
            ),
            _ => (SlotKey::AllDay, None, None),
        };
        push(days, start.date, key, occurrence(&event, formatted_start, formatted_end));
        return;
    }

    // Only walk the part of the span that can survive the window
    let first = start.date.max(options.window_start);
    let last = end.date.min(options.window_end());
    for date in first.iter_days().take_while(|d| *d <= last) {
        if all_day && date == end.date {
            continue;
        }
        let (key, formatted_start) = match start.time {
            Some(start_time) if date == start.date && !all_day => (
                SlotKey::Timed(start_time),
                Some(format_time(start.date, start_time, &site.time_format)),
            ),
            _ => (SlotKey::AllDay, None),
        };
        push(days, date, key, occurrence(&event, formatted_start, None));
    }
}

/// End time shown for a single-day timed event.
///
/// With `legacy_end_time` the value is built from the end date alone, which
/// is assumed to render midnight. That baseline was inferred from the
/// date-only construction and has not been checked against a live screen.
/// Confirm it before changing the flag's default.
fn same_day_end(end: &LocalStamp, site: &SiteSettings) -> String {
    let time = if site.legacy_end_time {
        NaiveTime::MIN
    } else {
        end.time.unwrap_or(NaiveTime::MIN)
    };
    format_time(end.date, time, &site.time_format)
}

fn occurrence(
    event: &RawEvent,
    formatted_start: Option<String>,
    formatted_end: Option<String>,
) -> ExpandedOccurrence {
    ExpandedOccurrence {
        label: event.summary.clone(),
        description: event.description.clone(),
        location: event.location.clone(),
        start_raw: event.start_raw.clone(),
        end_raw: event.end_raw.clone(),
        formatted_start,
        formatted_end,
    }
}

fn push(
    days: &mut BTreeMap<NaiveDate, DayBucket>,
    date: NaiveDate,
    key: SlotKey,
    occurrence: ExpandedOccurrence,
) {
    days.entry(date)
        .or_default()
        .entry(key)
        .or_default()
        .push(occurrence);
}

fn year_month(date: NaiveDate) -> YearMonth {
    YearMonth {
        year: date.year(),
        month: date.month(),
    }
}
