//! ICS parsing on top of the icalendar crate's grammar.

use super::models::{EventTime, ParsedCalendar, RawEvent};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use icalendar::parser::{read_calendar, unfold, Component, Property};
use tracing::{debug, warn};

/// Parse a whole feed. Never fails: unreadable input gives an empty calendar
pub fn parse_calendar(content: &str) -> ParsedCalendar {
    if content.trim().is_empty() {
        return ParsedCalendar::default();
    }

    let unfolded = unfold(content);
    let calendar = match read_calendar(&unfolded) {
        Ok(calendar) => calendar,
        Err(e) => {
            warn!("Failed to parse ICS feed: {}", e);
            return ParsedCalendar::default();
        }
    };

    let name = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-CALNAME")
        .map(text_value)
        .unwrap_or_default();
    let description = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-CALDESC")
        .map(text_value)
        .unwrap_or_default();

    let events: Vec<RawEvent> = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(parse_event)
        .collect();
    debug!("Parsed {} events from feed {:?}", events.len(), name);

    ParsedCalendar {
        name,
        description,
        events,
    }
}

fn parse_event(vevent: &Component) -> RawEvent {
    let start_prop = vevent.find_prop("DTSTART");
    let end_prop = vevent.find_prop("DTEND");

    let start = start_prop.and_then(parse_event_time);
    let end = match end_prop {
        Some(prop) => parse_event_time(prop),
        None => start.as_ref().and_then(|start| {
            let duration = vevent.find_prop("DURATION")?;
            apply_duration(start, duration.val.as_ref())
        }),
    };

    RawEvent {
        start,
        end,
        start_raw: start_prop.map(|p| p.val.to_string()).unwrap_or_default(),
        end_raw: end_prop.map(|p| p.val.to_string()).unwrap_or_default(),
        summary: optional_text(vevent, "SUMMARY"),
        description: optional_text(vevent, "DESCRIPTION"),
        location: optional_text(vevent, "LOCATION"),
    }
}

fn optional_text(component: &Component, name: &str) -> String {
    component.find_prop(name).map(text_value).unwrap_or_default()
}

fn text_value(prop: &Property) -> String {
    unescape_text(prop.val.as_ref())
}

/// Parse a DTSTART/DTEND property.
///
/// Handles:
/// - `VALUE=DATE` or a bare 8-digit date: `DTSTART;VALUE=DATE:20250106`
/// - UTC: `DTSTART:20250106T080000Z`
/// - TZID: `DTSTART;TZID=Europe/Paris:20250106T090000`
/// - Floating: `DTSTART:20250106T090000`
fn parse_event_time(prop: &Property) -> Option<EventTime> {
    let value = prop.val.as_ref().trim();
    let tzid = param(prop, "TZID");
    let is_date = param(prop, "VALUE").as_deref() == Some("DATE")
        || (value.len() == 8 && !value.contains('T'));

    let parsed = if is_date {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(EventTime::Date)
    } else if let Some(utc) = value.strip_suffix('Z') {
        NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .ok()
            .map(EventTime::Utc)
    } else {
        NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
            .ok()
            .map(|datetime| match tzid {
                Some(tzid) => EventTime::Zoned { datetime, tzid },
                None => EventTime::Floating(datetime),
            })
    };

    if parsed.is_none() {
        debug!("Unreadable {} value {:?}", prop.name.as_ref(), value);
    }
    parsed
}

fn param(prop: &Property, key: &str) -> Option<String> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref().map(|v| v.as_ref().trim_matches('"').to_string()))
}

/// End of an event given as DTSTART plus DURATION (`PT1H30M`, `P1D`, ...)
fn apply_duration(start: &EventTime, value: &str) -> Option<EventTime> {
    if value.starts_with('-') {
        return None;
    }
    let duration = iso8601::duration(value.trim_start_matches('+')).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let span = Duration::from_std(std_duration).ok()?;

    let end = match start {
        EventTime::Date(date) => date
            .checked_add_signed(Duration::days(span.num_days()))
            .map(EventTime::Date),
        EventTime::Utc(dt) => dt.checked_add_signed(span).map(EventTime::Utc),
        EventTime::Zoned { datetime, tzid } => {
            datetime
                .checked_add_signed(span)
                .map(|datetime| EventTime::Zoned {
                    datetime,
                    tzid: tzid.clone(),
                })
        }
        EventTime::Floating(dt) => dt.checked_add_signed(span).map(EventTime::Floating),
    };
    if end.is_none() {
        debug!("DURATION {:?} overflows the calendar range", value);
    }
    end
}

/// Undo RFC 5545 TEXT escaping
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
