//! Read contract for the schedule stores and the query built on it.

use super::countdown::{evaluate, SessionStatus};
use super::error::ScheduleError;
use super::resolver::{OccurrencePage, OccurrenceResolver, PageRequest};
use super::types::{OverrideSet, ResolvedOccurrence, WeeklySchedule};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, error};

/// Read access to the weekly schedule, overrides and global settings.
///
/// Implementations return `DataUnavailable` when the backing store cannot be
/// reached and skip individual malformed rows.
pub trait ScheduleStore: Send + Sync {
    /// All weekly entries, keyed by day.
    fn weekly_schedule(&self) -> Result<WeeklySchedule, ScheduleError>;

    /// Overrides with `start <= date <= end`.
    fn overrides_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OverrideSet, ScheduleError>;

    /// The meeting link shown with every session.
    fn default_zoom_link(&self) -> Result<String, ScheduleError>;
}

/// A page of upcoming sessions plus the link to join them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingSchedule {
    #[serde(flatten)]
    pub page: OccurrencePage,
    pub zoom_link: String,
}

/// The next session with its countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSession {
    pub next: Option<NextOccurrence>,
    pub zoom_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOccurrence {
    pub id: String,
    #[serde(flatten)]
    pub occurrence: ResolvedOccurrence,
    pub starts_at: DateTime<Utc>,
    pub status: SessionStatus,
}

/// Reads the weekly schedule and the overrides covering the resolver's horizon.
fn load_inputs(
    store: &dyn ScheduleStore,
    resolver: &OccurrenceResolver,
    now: DateTime<Utc>,
) -> Result<(WeeklySchedule, OverrideSet), ScheduleError> {
    let weekly = store.weekly_schedule().inspect_err(|e| {
        error!("Failed to read weekly schedule: {}", e);
    })?;

    let overrides = match resolver.date_range(now) {
        Some((start, end)) => store.overrides_between(start, end).inspect_err(|e| {
            error!("Failed to read overrides {} to {}: {}", start, end, e);
        })?,
        None => OverrideSet::new(),
    };

    debug!(
        "Loaded {} weekly entries and {} overrides",
        weekly.len(),
        overrides.len()
    );
    Ok((weekly, overrides))
}

/// Resolves one page of upcoming sessions from the store.
///
/// A store failure is returned as an error; an empty schedule is an empty page.
pub fn load_upcoming(
    store: &dyn ScheduleStore,
    resolver: &OccurrenceResolver,
    now: DateTime<Utc>,
    page: PageRequest,
) -> Result<UpcomingSchedule, ScheduleError> {
    let (weekly, overrides) = load_inputs(store, resolver, now)?;
    let zoom_link = store.default_zoom_link()?;

    Ok(UpcomingSchedule {
        page: resolver.resolve_page(now, &weekly, &overrides, page),
        zoom_link,
    })
}

/// Finds the first upcoming session and evaluates its countdown at `now`.
pub fn load_next(
    store: &dyn ScheduleStore,
    resolver: &OccurrenceResolver,
    now: DateTime<Utc>,
) -> Result<NextSession, ScheduleError> {
    let (weekly, overrides) = load_inputs(store, resolver, now)?;
    let zoom_link = store.default_zoom_link()?;

    let next = resolver
        .occurrences(now, &weekly, &overrides)
        .next()
        .map(|occurrence| NextOccurrence {
            id: occurrence.id(),
            starts_at: occurrence.starts_at(),
            status: evaluate(&occurrence, now),
            occurrence,
        });

    Ok(NextSession { next, zoom_link })
}
