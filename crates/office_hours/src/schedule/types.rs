/// Types for the weekly schedule, date overrides and resolved sessions
use super::time::{default_session_time, format_date, utc_time_serde};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Day of the week, numbered Monday=1 through Sunday=7.
///
/// This is the numbering used by the `weekly_schedule` table. Conversions
/// from other conventions go through the functions here, never inline
/// arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Returns the stored day number (Monday=1 .. Sunday=7).
    pub fn number(self) -> u8 {
        match self {
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
            DayOfWeek::Sunday => 7,
        }
    }

    /// Inverse of [`DayOfWeek::number`].
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=7 => Some(Self::ALL[usize::from(number) - 1]),
            _ => None,
        }
    }

    /// Maps the Sunday=0 .. Saturday=6 convention, remapping Sunday to 7.
    pub fn from_sunday_zero(number: u8) -> Option<Self> {
        match number {
            0 => Some(DayOfWeek::Sunday),
            n => Self::from_number(n).filter(|d| *d != DayOfWeek::Sunday),
        }
    }

    /// Day of the week for a calendar date.
    pub fn of_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        date.weekday().into()
    }

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the weekly template. `time` is UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyScheduleEntry {
    pub day: DayOfWeek,
    pub enabled: bool,
    pub time: NaiveTime,
}

impl WeeklyScheduleEntry {
    pub fn new(day: DayOfWeek, enabled: bool, time: Option<NaiveTime>) -> Self {
        Self {
            day,
            enabled,
            time: time.unwrap_or_else(default_session_time),
        }
    }
}

/// The weekly template, at most one entry per day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    entries: BTreeMap<DayOfWeek, WeeklyScheduleEntry>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monday through Friday enabled at the same UTC time; weekend absent.
    pub fn weekdays_at(time: NaiveTime) -> Self {
        let mut schedule = Self::new();
        for day in &DayOfWeek::ALL[..5] {
            schedule.insert(WeeklyScheduleEntry::new(*day, true, Some(time)));
        }
        schedule
    }

    /// Inserts or replaces the entry for `entry.day`.
    pub fn insert(&mut self, entry: WeeklyScheduleEntry) {
        self.entries.insert(entry.day, entry);
    }

    pub fn get(&self, day: DayOfWeek) -> Option<&WeeklyScheduleEntry> {
        self.entries.get(&day)
    }

    /// The entry for `day` if it exists and is enabled.
    pub fn enabled_entry(&self, day: DayOfWeek) -> Option<&WeeklyScheduleEntry> {
        self.get(day).filter(|e| e.enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeeklyScheduleEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<WeeklyScheduleEntry> for WeeklySchedule {
    fn from_iter<I: IntoIterator<Item = WeeklyScheduleEntry>>(iter: I) -> Self {
        let mut schedule = Self::new();
        for entry in iter {
            schedule.insert(entry);
        }
        schedule
    }
}

/// A single-date exception to the weekly template. `time` is UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOverride {
    pub date: NaiveDate,
    pub is_available: bool,
    pub time: Option<NaiveTime>,
}

impl DateOverride {
    /// Suppresses the date entirely.
    pub fn unavailable(date: NaiveDate) -> Self {
        Self {
            date,
            is_available: false,
            time: None,
        }
    }

    /// Holds the session on `date` at `time` instead of the weekly time.
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            is_available: true,
            time: Some(time),
        }
    }
}

/// Overrides keyed by date, at most one per date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    by_date: BTreeMap<NaiveDate, DateOverride>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the override for `o.date`.
    pub fn upsert(&mut self, o: DateOverride) {
        self.by_date.insert(o.date, o);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DateOverride> {
        self.by_date.get(&date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateOverride> {
        self.by_date.values()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

impl FromIterator<DateOverride> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = DateOverride>>(iter: I) -> Self {
        let mut set = Self::new();
        for o in iter {
            set.upsert(o);
        }
        set
    }
}

/// A concrete session derived from the template and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOccurrence {
    pub date: NaiveDate,
    #[serde(with = "utc_time_serde")]
    pub time: NaiveTime,
    pub is_override: bool,
}

impl ResolvedOccurrence {
    /// The instant the session starts.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }

    /// Identifier stable for a given date and time, e.g. `2024-06-03-15:00:00`.
    pub fn id(&self) -> String {
        format!(
            "{}-{}",
            format_date(self.date),
            super::time::format_utc_time(self.time)
        )
    }
}

/// Process-wide settings held in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub default_zoom_link: String,
}
