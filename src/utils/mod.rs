pub mod weekdays;
