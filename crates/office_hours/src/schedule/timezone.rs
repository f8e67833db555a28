//! Conversion between local wall-clock times and stored UTC times.
//!
//! Offsets depend on the calendar date (daylight saving), so every conversion
//! takes a reference date. Unknown zone identifiers fall back to treating the
//! time as already UTC; callers that must not guess should check the
//! identifier with [`parse_timezone`] first.

use super::error::ScheduleError;
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use tracing::warn;

/// Parses an IANA timezone identifier such as `Europe/Berlin`.
pub fn parse_timezone(timezone: &str) -> Result<Tz, ScheduleError> {
    timezone
        .trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone {
            value: timezone.to_string(),
        })
}

/// Looks up the zone, falling back to UTC with a warning.
fn zone_or_utc(timezone: &str) -> Tz {
    parse_timezone(timezone).unwrap_or_else(|_| {
        warn!(
            "Unknown timezone identifier {:?}, treating time as UTC",
            timezone
        );
        Tz::UTC
    })
}

/// Pins a local wall-clock time to an instant.
///
/// Times inside a spring-forward gap move one hour later; times inside a
/// fall-back overlap take the earlier instant.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Converts a local time in `timezone` on `reference_date` to a UTC time of day.
///
/// The UTC instant may fall on a neighbouring calendar day; only its time of
/// day is returned.
pub fn local_to_utc_time(local: NaiveTime, reference_date: NaiveDate, timezone: &str) -> NaiveTime {
    let tz = zone_or_utc(timezone);
    resolve_local(tz, reference_date.and_time(local))
        .with_timezone(&Utc)
        .time()
}

/// Converts a UTC time of day on `reference_date` to local `HH:MM` in `timezone`.
///
/// Seconds are dropped.
pub fn utc_to_local_time(utc: NaiveTime, reference_date: NaiveDate, timezone: &str) -> NaiveTime {
    let tz = zone_or_utc(timezone);
    let local = Utc
        .from_utc_datetime(&reference_date.and_time(utc))
        .with_timezone(&tz)
        .time();
    NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).unwrap_or(local)
}
