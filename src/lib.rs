//! ICS timetable ingestion for departmental signage screens.
//!
//! A feed is fetched per calendar code, parsed into raw events and expanded
//! into a year -> month -> day -> slot schedule over a rolling display window.

#[macro_use]
extern crate rust_i18n;

pub mod components;
pub mod config;
pub mod error;
pub mod startup;
pub mod utils;

pub use components::ics_calendar::{ExpandOptions, ScheduleResult};
pub use components::AgendaService;

// Initialize i18n
i18n!("locales", fallback = "en");
