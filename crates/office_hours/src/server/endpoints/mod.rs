pub mod calendar;
pub mod config;
pub mod occurrences;
pub mod overrides;
pub mod status;
