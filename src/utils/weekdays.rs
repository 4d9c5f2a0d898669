use rust_i18n::t;
use serde::Serialize;

/// Translation keys, indexed from Sunday
const DAY_KEYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Localized names of one weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayNames {
    pub full: String,
    pub short: String,
    pub min: String,
}

/// A weekday table entry, keyed by its Sunday-based index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Weekday {
    pub index: u8,
    pub names: DayNames,
}

/// Sunday-first table of localized day names
pub fn week_table(locale: &str) -> Vec<Weekday> {
    DAY_KEYS
        .iter()
        .zip(0u8..)
        .map(|(day, index)| Weekday {
            index,
            names: day_names(locale, day),
        })
        .collect()
}

fn day_names(locale: &str, day: &str) -> DayNames {
    let full = format!("weekday.{}.full", day);
    let short = format!("weekday.{}.short", day);
    let min = format!("weekday.{}.min", day);
    DayNames {
        full: t!(full.as_str(), locale = locale).to_string(),
        short: t!(short.as_str(), locale = locale).to_string(),
        min: t!(min.as_str(), locale = locale).to_string(),
    }
}

/// Move every entry keyed below `start_of_week` to the back, one key at a time.
///
/// Each entry is removed and re-inserted under the same key, which appends it.
pub fn rotate_week(mut days: Vec<Weekday>, start_of_week: u8) -> Vec<Weekday> {
    for key in 0..start_of_week {
        if let Some(position) = days.iter().position(|d| d.index == key) {
            let day = days.remove(position);
            days.push(day);
        }
    }
    days
}

/// Localized table in display order for the configured first day
pub fn rotated_week(locale: &str, start_of_week: u8) -> Vec<Weekday> {
    rotate_week(week_table(locale), start_of_week)
}
