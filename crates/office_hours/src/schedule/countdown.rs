//! Countdown and live-window evaluation for a resolved session.

use super::types::ResolvedOccurrence;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Assumed length of every session, in seconds.
pub const SESSION_LENGTH_SECS: i64 = 3_600;

/// Time left until a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// Breaks a positive duration into days, hours, minutes and seconds.
    ///
    /// A partial second counts as a whole one, so the countdown reads zero
    /// only once the session has started.
    fn from_duration(d: Duration) -> Self {
        let whole = d.num_seconds();
        let total = if d > Duration::seconds(whole) {
            whole + 1
        } else {
            whole
        };
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }
}

/// Countdown state for one session at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// `None` once the session has started.
    pub remaining: Option<Remaining>,
    /// True from the start instant through one hour after, inclusive.
    pub is_live: bool,
}

/// Evaluates the countdown for `occurrence` at `now`.
pub fn evaluate(occurrence: &ResolvedOccurrence, now: DateTime<Utc>) -> SessionStatus {
    let start = occurrence.starts_at();
    let until_start = start - now;

    let remaining = if until_start > Duration::zero() {
        Some(Remaining::from_duration(until_start))
    } else {
        None
    };

    SessionStatus {
        remaining,
        is_live: start <= now && now <= start + Duration::seconds(SESSION_LENGTH_SECS),
    }
}
