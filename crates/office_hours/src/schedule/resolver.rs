//! Next-occurrence resolution over a fixed forward horizon.
//!
//! For each calendar day starting at the UTC day of `now`:
//! 1. an unavailable override suppresses the day;
//! 2. an available override emits its own time (see [`UntimedOverride`]);
//! 3. otherwise an enabled weekly entry emits the weekly time, unless the day
//!    is today and that time has already passed.
//!
//! Days are visited in order and each contributes at most one occurrence, so
//! the output is chronological without sorting.

use super::time::default_session_time;
use super::types::{DayOfWeek, OverrideSet, ResolvedOccurrence, WeeklySchedule};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

/// Days scanned per resolution call unless configured otherwise.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Page size used when the caller does not give one.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: usize = 100;

/// What to do with an available override that carries no time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntimedOverride {
    /// Emit nothing for the date.
    Suppress,
    /// Emit the weekly time for that weekday (15:00 UTC if the day has no entry).
    UseWeeklyTime,
}

/// Policy applied by [`OccurrenceResolver::new`].
pub const UNTIMED_OVERRIDE_POLICY: UntimedOverride = UntimedOverride::Suppress;

/// Resolves the weekly template and overrides into concrete sessions.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceResolver {
    horizon_days: u32,
    untimed_override: UntimedOverride,
}

impl OccurrenceResolver {
    pub fn new(horizon_days: u32) -> Self {
        Self {
            horizon_days,
            untimed_override: UNTIMED_OVERRIDE_POLICY,
        }
    }

    pub fn with_untimed_override(mut self, policy: UntimedOverride) -> Self {
        self.untimed_override = policy;
        self
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// First and last calendar day (inclusive) scanned for `now`.
    ///
    /// Returns `None` for a zero-day horizon.
    pub fn date_range(&self, now: DateTime<Utc>) -> Option<(NaiveDate, NaiveDate)> {
        let start = now.date_naive();
        let last_offset = self.horizon_days.checked_sub(1)?;
        let end = start.checked_add_days(Days::new(u64::from(last_offset)))?;
        Some((start, end))
    }

    /// Lazily yields every occurrence within the horizon, earliest first.
    pub fn occurrences<'a>(
        &'a self,
        now: DateTime<Utc>,
        weekly: &'a WeeklySchedule,
        overrides: &'a OverrideSet,
    ) -> impl Iterator<Item = ResolvedOccurrence> + 'a {
        let today = now.date_naive();
        (0..self.horizon_days)
            .map_while(move |offset| today.checked_add_days(Days::new(u64::from(offset))))
            .filter_map(move |date| self.resolve_date(now, date, weekly, overrides))
    }

    /// Resolves one calendar day.
    fn resolve_date(
        &self,
        now: DateTime<Utc>,
        date: NaiveDate,
        weekly: &WeeklySchedule,
        overrides: &OverrideSet,
    ) -> Option<ResolvedOccurrence> {
        let day = DayOfWeek::of_date(date);

        if let Some(o) = overrides.get(date) {
            if !o.is_available {
                return None;
            }
            let time = match (o.time, self.untimed_override) {
                (Some(time), _) => time,
                (None, UntimedOverride::Suppress) => return None,
                (None, UntimedOverride::UseWeeklyTime) => weekly
                    .get(day)
                    .map(|e| e.time)
                    .unwrap_or_else(default_session_time),
            };
            return Some(ResolvedOccurrence {
                date,
                time,
                is_override: true,
            });
        }

        let entry = weekly.enabled_entry(day)?;

        // Same-day cutoff applies to the weekly slot only
        if date == now.date_naive() && date.and_time(entry.time).and_utc() < now {
            return None;
        }

        Some(ResolvedOccurrence {
            date,
            time: entry.time,
            is_override: false,
        })
    }

    /// Resolves the full horizon and slices `[offset, offset + limit)`.
    pub fn resolve_page(
        &self,
        now: DateTime<Utc>,
        weekly: &WeeklySchedule,
        overrides: &OverrideSet,
        page: PageRequest,
    ) -> OccurrencePage {
        let all: Vec<_> = self.occurrences(now, weekly, overrides).collect();
        OccurrencePage::slice(all, page)
    }
}

impl Default for OccurrenceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON_DAYS)
    }
}

/// Pagination window over the resolved sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Builds a window, applying defaults and capping the limit.
    pub fn new(offset: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of resolved occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrencePage {
    pub upcoming: Vec<ResolvedOccurrence>,
    pub total: usize,
    pub has_more: bool,
    pub offset: usize,
    pub limit: usize,
}

impl OccurrencePage {
    fn slice(all: Vec<ResolvedOccurrence>, page: PageRequest) -> Self {
        let total = all.len();
        let end = page.offset.saturating_add(page.limit);
        let upcoming = all
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();

        Self {
            upcoming,
            total,
            has_more: end < total,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{DateOverride, WeeklyScheduleEntry};
    use chrono::{NaiveTime, TimeZone};

    // 2024-06-03 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn day(offset: u64) -> NaiveDate {
        monday().checked_add_days(Days::new(offset)).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday_at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
    }

    fn weekdays_15() -> WeeklySchedule {
        WeeklySchedule::weekdays_at(at(15, 0))
    }

    fn resolve(
        now: DateTime<Utc>,
        weekly: &WeeklySchedule,
        overrides: &OverrideSet,
    ) -> Vec<ResolvedOccurrence> {
        OccurrenceResolver::default()
            .occurrences(now, weekly, overrides)
            .collect()
    }

    #[test]
    fn test_first_occurrence_is_today_before_slot() {
        let out = resolve(monday_at(10, 0), &weekdays_15(), &OverrideSet::new());
        assert_eq!(
            out[0],
            ResolvedOccurrence {
                date: monday(),
                time: at(15, 0),
                is_override: false
            }
        );
    }

    #[test]
    fn test_today_skipped_after_slot() {
        let out = resolve(monday_at(16, 0), &weekdays_15(), &OverrideSet::new());
        assert_eq!(
            out[0],
            ResolvedOccurrence {
                date: day(1),
                time: at(15, 0),
                is_override: false
            }
        );
    }

    #[test]
    fn test_today_kept_at_exact_slot_time() {
        let out = resolve(monday_at(15, 0), &weekdays_15(), &OverrideSet::new());
        assert_eq!(out[0].date, monday());
    }

    #[test]
    fn test_unavailable_override_removes_only_that_day() {
        let overrides: OverrideSet = [DateOverride::unavailable(day(2))].into_iter().collect();
        let out = resolve(monday_at(10, 0), &weekdays_15(), &overrides);

        assert!(out.iter().all(|o| o.date != day(2)));
        let thursday = out.iter().find(|o| o.date == day(3)).unwrap();
        assert_eq!(thursday.time, at(15, 0));
        assert!(!thursday.is_override);
    }

    #[test]
    fn test_unavailable_override_always_wins() {
        // Overrides on every enabled day of the first week, plus a weekend day
        let overrides: OverrideSet = (0..7).map(|i| DateOverride::unavailable(day(i))).collect();
        let out = resolve(monday_at(0, 0), &weekdays_15(), &overrides);
        assert!(out.iter().all(|o| o.date >= day(7)));
    }

    #[test]
    fn test_timed_override_replaces_weekly_time() {
        let overrides: OverrideSet = [
            DateOverride::at(day(1), at(9, 30)),
            // Saturday is not in the weekly schedule
            DateOverride::at(day(5), at(11, 0)),
        ]
        .into_iter()
        .collect();
        let out = resolve(monday_at(10, 0), &weekdays_15(), &overrides);

        let tuesday = out.iter().find(|o| o.date == day(1)).unwrap();
        assert_eq!(tuesday.time, at(9, 30));
        assert!(tuesday.is_override);

        let saturday = out.iter().find(|o| o.date == day(5)).unwrap();
        assert_eq!(saturday.time, at(11, 0));
        assert!(saturday.is_override);
        assert_eq!(out.iter().filter(|o| o.date == day(1)).count(), 1);
    }

    #[test]
    fn test_untimed_override_suppresses_date() {
        let overrides: OverrideSet = [DateOverride {
            date: day(2),
            is_available: true,
            time: None,
        }]
        .into_iter()
        .collect();
        let out = resolve(monday_at(10, 0), &weekdays_15(), &overrides);
        assert!(out.iter().all(|o| o.date != day(2)));
        assert_eq!(UNTIMED_OVERRIDE_POLICY, UntimedOverride::Suppress);
    }

    #[test]
    fn test_untimed_override_can_use_weekly_time() {
        let overrides: OverrideSet = [
            DateOverride {
                date: day(2),
                is_available: true,
                time: None,
            },
            DateOverride {
                date: day(6),
                is_available: true,
                time: None,
            },
        ]
        .into_iter()
        .collect();
        let resolver =
            OccurrenceResolver::default().with_untimed_override(UntimedOverride::UseWeeklyTime);
        let out: Vec<_> = resolver
            .occurrences(monday_at(10, 0), &weekdays_15(), &overrides)
            .collect();

        let wednesday = out.iter().find(|o| o.date == day(2)).unwrap();
        assert_eq!(wednesday.time, at(15, 0));
        assert!(wednesday.is_override);
        // Sunday has no weekly entry and falls back to the default time
        let sunday = out.iter().find(|o| o.date == day(6)).unwrap();
        assert_eq!(sunday.time, at(15, 0));
    }

    #[test]
    fn test_past_override_today_is_not_cut_off() {
        let overrides: OverrideSet = [DateOverride::at(monday(), at(8, 0))].into_iter().collect();
        let out = resolve(monday_at(12, 0), &weekdays_15(), &overrides);
        assert_eq!(
            out[0],
            ResolvedOccurrence {
                date: monday(),
                time: at(8, 0),
                is_override: true
            }
        );
    }

    #[test]
    fn test_cutoff_only_applies_to_first_day() {
        // A slot at 00:00 on later days is never considered passed
        let weekly = WeeklySchedule::weekdays_at(at(0, 0));
        let out = resolve(monday_at(23, 59), &weekly, &OverrideSet::new());
        assert_eq!(out[0].date, day(1));
        assert_eq!(out[0].time, at(0, 0));
    }

    #[test]
    fn test_disabled_and_missing_days_are_skipped() {
        let mut weekly = weekdays_15();
        weekly.insert(WeeklyScheduleEntry::new(DayOfWeek::Tuesday, false, Some(at(15, 0))));
        let out = resolve(monday_at(0, 0), &weekly, &OverrideSet::new());

        for occ in &out {
            let d = DayOfWeek::of_date(occ.date);
            assert!(weekly.enabled_entry(d).is_some(), "{d} should not be emitted");
        }
        // Four enabled weekdays per week over 30 days starting on a Monday
        assert_eq!(out.len(), 4 * 4 + 1);
    }

    #[test]
    fn test_sunday_entry_is_honoured() {
        let mut weekly = WeeklySchedule::new();
        weekly.insert(WeeklyScheduleEntry::new(DayOfWeek::Sunday, true, Some(at(18, 0))));
        let out = resolve(monday_at(0, 0), &weekly, &OverrideSet::new());
        assert_eq!(out[0].date, day(6));
        assert!(out.iter().all(|o| DayOfWeek::of_date(o.date) == DayOfWeek::Sunday));
    }

    #[test]
    fn test_output_is_strictly_increasing() {
        let overrides: OverrideSet = [
            DateOverride::at(day(1), at(23, 0)),
            DateOverride::at(day(2), at(1, 0)),
            DateOverride::unavailable(day(8)),
            DateOverride::at(day(13), at(6, 0)),
        ]
        .into_iter()
        .collect();
        let out = resolve(monday_at(9, 0), &weekdays_15(), &overrides);

        assert!(out
            .windows(2)
            .all(|w| (w[0].date, w[0].time) < (w[1].date, w[1].time)));
    }

    #[test]
    fn test_horizon_bounds_the_scan() {
        let out = resolve(monday_at(0, 0), &weekdays_15(), &OverrideSet::new());
        let (start, end) = OccurrenceResolver::default()
            .date_range(monday_at(0, 0))
            .unwrap();
        assert_eq!(start, monday());
        assert_eq!(end, day(29));
        assert!(out.iter().all(|o| o.date >= start && o.date <= end));

        let short = OccurrenceResolver::new(1);
        assert_eq!(
            short
                .occurrences(monday_at(0, 0), &weekdays_15(), &OverrideSet::new())
                .count(),
            1
        );
        assert!(OccurrenceResolver::new(0).date_range(monday_at(0, 0)).is_none());
    }

    #[test]
    fn test_pages_tile_the_full_sequence() {
        let resolver = OccurrenceResolver::default();
        let overrides: OverrideSet = [DateOverride::unavailable(day(9))].into_iter().collect();
        let now = monday_at(16, 0);
        let weekly = weekdays_15();
        let full: Vec<_> = resolver.occurrences(now, &weekly, &overrides).collect();

        let pages = [
            PageRequest { offset: 0, limit: 5 },
            PageRequest { offset: 5, limit: 7 },
            PageRequest { offset: 12, limit: 50 },
        ];
        let mut tiled = Vec::new();
        for page in pages {
            let p = resolver.resolve_page(now, &weekly, &overrides, page);
            assert_eq!(p.total, full.len());
            tiled.extend(p.upcoming);
        }
        assert_eq!(tiled, full);
    }

    #[test]
    fn test_page_has_more_flag() {
        let resolver = OccurrenceResolver::default();
        let weekly = weekdays_15();
        let now = monday_at(0, 0);
        let total = resolver.occurrences(now, &weekly, &OverrideSet::new()).count();

        let first = resolver.resolve_page(
            now,
            &weekly,
            &OverrideSet::new(),
            PageRequest::new(None, Some(1)),
        );
        assert_eq!(first.upcoming.len(), 1);
        assert!(first.has_more);

        let last = resolver.resolve_page(
            now,
            &weekly,
            &OverrideSet::new(),
            PageRequest::new(Some(total - 2), Some(2)),
        );
        assert_eq!(last.upcoming.len(), 2);
        assert!(!last.has_more);

        let past_end = resolver.resolve_page(
            now,
            &weekly,
            &OverrideSet::new(),
            PageRequest::new(Some(total + 10), None),
        );
        assert!(past_end.upcoming.is_empty());
        assert!(!past_end.has_more);
        assert_eq!(past_end.total, total);
    }

    #[test]
    fn test_page_request_defaults_and_cap() {
        assert_eq!(PageRequest::default(), PageRequest { offset: 0, limit: 10 });
        assert_eq!(PageRequest::new(Some(3), Some(10_000)).limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_empty_schedule_is_empty_not_error() {
        let resolver = OccurrenceResolver::default();
        let page = resolver.resolve_page(
            monday_at(0, 0),
            &WeeklySchedule::new(),
            &OverrideSet::new(),
            PageRequest::default(),
        );
        assert!(page.upcoming.is_empty());
        assert_eq!(page.total, 0);
        assert!(!page.has_more);
    }
}
