// Export components
pub mod feed_cache;
pub mod ics_calendar;

// Re-export the per-request entry point
pub use ics_calendar::AgendaService;
