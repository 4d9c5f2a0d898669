pub mod expander;
pub mod fetcher;
pub mod models;
pub mod parser;
mod service;
pub mod time;

pub use expander::{expand, expand_events, ExpandOptions};
pub use fetcher::{CalendarFetcher, FeedSource};
pub use models::{
    DayBucket, EventTime, ExpandedOccurrence, Heading, ParsedCalendar, RawEvent, ScheduleResult,
    SlotKey, YearMonth,
};
pub use parser::parse_calendar;
pub use service::AgendaService;
pub use time::SiteSettings;
