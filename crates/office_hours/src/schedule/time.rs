//! Parsing and formatting of time-of-day and calendar-date strings.

use super::error::ScheduleError;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

/// Time used for a weekly schedule row that has no time stored (15:00 UTC).
pub fn default_session_time() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN)
}

static TIME_OF_DAY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):([0-5][0-9])(?::([0-5][0-9]))?$").unwrap()
});

/// Parses a 24-hour `HH:MM` or `HH:MM:SS` string.
///
/// Surrounding whitespace is ignored; anything else (single-digit hours,
/// fractional seconds, `24:00`) is rejected.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ScheduleError> {
    let invalid = || ScheduleError::InvalidTimeFormat {
        value: value.to_string(),
    };

    let caps = TIME_OF_DAY_REGEX.captures(value.trim()).ok_or_else(invalid)?;
    let field = |i: usize| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    NaiveTime::from_hms_opt(field(1), field(2), field(3)).ok_or_else(invalid)
}

/// Formats a time as stored: `HH:MM:SS`.
pub fn format_utc_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Formats a time as shown to admins: `HH:MM`.
pub fn format_local_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ScheduleError::InvalidDate {
        value: value.to_string(),
    })
}

/// Formats a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Serde helpers for `NaiveTime` fields carried as `HH:MM:SS`.
pub mod utc_time_serde {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_utc_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}
