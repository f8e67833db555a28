//! Error types for the scheduling subsystem.

use thiserror::Error;

/// Errors that can occur while reading, resolving, or writing the schedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The schedule or override store could not be read or written
    #[error("Schedule data unavailable: {message}")]
    DataUnavailable { message: String },

    /// A time-of-day string was not `HH:MM` or `HH:MM:SS`
    #[error("Invalid time format: {value:?}")]
    InvalidTimeFormat { value: String },

    /// The timezone identifier is not a known IANA zone
    #[error("Invalid timezone: {value:?}")]
    InvalidTimezone { value: String },

    /// A calendar date was not `YYYY-MM-DD`, or a date range was inverted
    #[error("Invalid date: {value:?}")]
    InvalidDate { value: String },

    /// The meeting link is not an absolute URL
    #[error("Invalid zoom link {value:?}: {reason}")]
    InvalidZoomLink { value: String, reason: String },

    /// The addressed record does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },
}

impl ScheduleError {
    /// Returns true if the caller supplied bad input (as opposed to a storage failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidTimeFormat { .. }
                | ScheduleError::InvalidTimezone { .. }
                | ScheduleError::InvalidDate { .. }
                | ScheduleError::InvalidZoomLink { .. }
        )
    }
}

impl From<rusqlite::Error> for ScheduleError {
    fn from(err: rusqlite::Error) -> Self {
        ScheduleError::DataUnavailable {
            message: err.to_string(),
        }
    }
}
