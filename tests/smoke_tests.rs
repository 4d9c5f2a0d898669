mod common;

use chrono::{NaiveDate, NaiveTime};
use common::{MockFeedCache, DEPARTMENT_FEED};
use ecran_agenda::components::ics_calendar::{Heading, SlotKey};
use ecran_agenda::config::{CalendarOverrides, Config};
use ecran_agenda::AgendaService;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Service reading `<dir>/<code>.ics`, running one hour ahead of UTC
fn service_for(dir: &std::path::Path, cache: MockFeedCache) -> AgendaService {
    let config = Config {
        feed_url: format!("{}/{{code}}.ics", dir.display()),
        gmt_offset: 3600,
        ..Config::default()
    };
    AgendaService::new(config, Arc::new(cache))
}

/// Smoke test to verify that logging can be installed once
#[test]
fn test_logging_initializes() {
    assert!(ecran_agenda::startup::init_logging().is_ok());
}

/// A minimal config can be built by hand
#[test]
fn test_config_loads() {
    let config = Config {
        feed_url: "https://ade.example/anonymous_cal.jsp?resources={code}".to_string(),
        ..Config::default()
    };

    assert_eq!(config.limit_days, 365);
    assert_eq!(
        config.feed_location("8382"),
        "https://ade.example/anonymous_cal.jsp?resources=8382"
    );
}

/// Full pipeline from a feed file to the nested schedule
#[tokio::test]
async fn test_schedule_from_local_feed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("8382.ics"), DEPARTMENT_FEED).unwrap();
    let service = service_for(dir.path(), MockFeedCache::new());

    let result = service.schedule("8382", date(2025, 1, 1)).await;

    assert_eq!(result.title, Heading::Text("Département Informatique".into()));
    assert_eq!(result.occurrence_count(), 3);
    assert_eq!(result.earliest.unwrap().to_string(), "202501");
    assert_eq!(result.latest.unwrap().to_string(), "202501");

    // Exam week: all-day, end date excluded
    let fifth = result.day(date(2025, 1, 5)).unwrap();
    assert_eq!(fifth[&SlotKey::AllDay][0].label, "Semaine d'examens");
    assert!(result.day(date(2025, 1, 7)).is_none());

    // Lecture at 08:00Z shown at 09:00 site time, after the all-day slot
    let sixth = result.day(date(2025, 1, 6)).unwrap();
    let keys: Vec<String> = sixth.keys().map(ToString::to_string).collect();
    assert_eq!(keys, vec!["all-day", "t090000"]);
    let lecture = &sixth[&SlotKey::Timed(NaiveTime::from_hms_opt(9, 0, 0).unwrap())][0];
    assert_eq!(lecture.location, "Amphi A");
    assert_eq!(lecture.formatted_start.as_deref(), Some("09:00"));
    assert_eq!(lecture.formatted_end.as_deref(), Some("00:00"));

    // December event is before the window
    assert!(!result.events[&2025].is_empty());
    assert!(!result.events.contains_key(&2024));
}

/// Title sentinel suppresses the heading and serializes as false
#[tokio::test]
async fn test_title_override_none() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("8382.ics"), DEPARTMENT_FEED).unwrap();
    let mut config = Config {
        feed_url: format!("{}/{{code}}.ics", dir.path().display()),
        ..Config::default()
    };
    config.calendars.insert(
        "8382".to_string(),
        CalendarOverrides {
            title: Some("none".to_string()),
            description: Some("Hall d'entrée".to_string()),
            ..CalendarOverrides::default()
        },
    );
    let service = AgendaService::new(config, Arc::new(MockFeedCache::new()));

    let result = service.schedule("8382", date(2025, 1, 1)).await;
    assert_eq!(result.title, Heading::Suppressed);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["title"], serde_json::Value::Bool(false));
    assert_eq!(json["description"], "Hall d'entrée");
}

/// Missing feed and no fallback: empty schedule, no markers
#[tokio::test]
async fn test_missing_feed_gives_empty_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_for(dir.path(), MockFeedCache::new());

    let result = service.schedule("9999", date(2025, 1, 1)).await;

    assert!(result.events.is_empty());
    assert!(result.earliest.is_none());
    assert!(result.latest.is_none());
    assert_eq!(result.title, Heading::Text(String::new()));
}

/// Weekday table follows the configured locale and first day
#[test]
fn test_weekdays_follow_config() {
    let config = Config {
        feed_url: "/srv/ics/{code}.ics".to_string(),
        locale: "fr".to_string(),
        start_of_week: 1,
        ..Config::default()
    };
    let service = AgendaService::new(config, Arc::new(MockFeedCache::new()));

    let days = service.weekdays();
    let names: Vec<&str> = days.iter().map(|d| d.names.full.as_str()).collect();
    assert_eq!(
        names,
        vec!["lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche"]
    );
}
