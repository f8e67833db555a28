/// Database module for the weekly schedule, overrides, settings and calendar tracking

mod types;

pub use types::{DbCalendarAddition, DbOverride, DbWeeklySchedule};

use crate::schedule::time::{format_date, format_utc_time, parse_date, parse_time_of_day};
use crate::schedule::{
    DateOverride, DayOfWeek, GlobalConfig, OverrideSet, ScheduleError, ScheduleStore,
    WeeklySchedule, WeeklyScheduleEntry,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_office_hours.sql");

/// Link returned when the settings row is missing.
pub const FALLBACK_ZOOM_LINK: &str = "https://zoom.us/j/example";

pub struct ScheduleDbManager {
    db: Mutex<Connection>,
}

impl ScheduleDbManager {
    /// Opens (or creates) the database at `db_path` and initializes the schema.
    ///
    /// `:memory:` gives a private in-memory database.
    pub fn new(db_path: &str) -> Result<Self, ScheduleError> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        info!("Opened schedule database at {}", db_path);

        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ScheduleError> {
        self.db.lock().map_err(|_| ScheduleError::DataUnavailable {
            message: "database connection poisoned".to_string(),
        })
    }

    /// Writes the settings row if none exists yet. Returns true if it was written.
    pub fn seed_default_zoom_link(&self, link: &str) -> Result<bool, ScheduleError> {
        let db = self.conn()?;
        let inserted = db.execute(
            "INSERT OR IGNORE INTO office_hours_config (id, default_zoom_link) VALUES (1, ?1)",
            [link],
        )?;
        Ok(inserted > 0)
    }

    /// Gets the raw weekly schedule rows, ordered by day
    pub fn weekly_schedule_rows(&self) -> Result<Vec<DbWeeklySchedule>, ScheduleError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT day_of_week, enabled, custom_time
             FROM weekly_schedule
             ORDER BY day_of_week",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(DbWeeklySchedule {
                day_of_week: row.get(0)?,
                enabled: row.get(1)?,
                custom_time: row.get(2)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Gets the raw override rows with `start <= date <= end`
    pub fn override_rows(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DbOverride>, ScheduleError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT date, is_available, time
             FROM office_hours_overrides
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date",
        )?;

        let rows = stmt.query_map(params![format_date(start), format_date(end)], |row| {
            Ok(DbOverride {
                date: row.get(0)?,
                is_available: row.get(1)?,
                time: row.get(2)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Replaces the weekly entries given (other days are left as they are) and,
    /// if given, the default zoom link, in one transaction.
    pub fn save_config(
        &self,
        default_zoom_link: Option<&str>,
        entries: &[WeeklyScheduleEntry],
    ) -> Result<(), ScheduleError> {
        let mut db = self.conn()?;
        let tx = db.transaction()?;

        if let Some(link) = default_zoom_link {
            tx.execute(
                "INSERT INTO office_hours_config (id, default_zoom_link, updated_at)
                 VALUES (1, ?1, datetime('now'))
                 ON CONFLICT(id) DO UPDATE SET
                    default_zoom_link = excluded.default_zoom_link,
                    updated_at = excluded.updated_at",
                [link],
            )?;
        }

        for entry in entries {
            tx.execute(
                "INSERT INTO weekly_schedule (day_of_week, enabled, custom_time, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))
                 ON CONFLICT(day_of_week) DO UPDATE SET
                    enabled = excluded.enabled,
                    custom_time = excluded.custom_time,
                    updated_at = excluded.updated_at",
                params![
                    entry.day.number(),
                    entry.enabled,
                    format_utc_time(entry.time)
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Inserts or replaces the override for its date
    pub fn upsert_override(&self, o: &DateOverride) -> Result<(), ScheduleError> {
        let db = self.conn()?;
        db.execute(
            "INSERT INTO office_hours_overrides (date, is_available, time, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(date) DO UPDATE SET
                is_available = excluded.is_available,
                time = excluded.time,
                updated_at = excluded.updated_at",
            params![format_date(o.date), o.is_available, o.time.map(format_utc_time)],
        )?;
        Ok(())
    }

    /// Removes the override for `date`. Returns false if there was none.
    pub fn delete_override(&self, date: NaiveDate) -> Result<bool, ScheduleError> {
        let db = self.conn()?;
        let deleted = db.execute(
            "DELETE FROM office_hours_overrides WHERE date = ?1",
            [format_date(date)],
        )?;
        Ok(deleted > 0)
    }

    /// Records one calendar addition
    pub fn record_calendar_addition(
        &self,
        addition: &DbCalendarAddition,
    ) -> Result<(), ScheduleError> {
        let db = self.conn()?;
        db.execute(
            "INSERT INTO calendar_additions (date, user_ip, user_agent, created_at)
             VALUES (?1, ?2, ?3, datetime('now'))",
            (&addition.date, &addition.user_ip, &addition.user_agent),
        )?;
        Ok(())
    }

    /// Counts calendar additions per session date with `start <= date <= end`
    pub fn calendar_addition_counts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<String, i64>, ScheduleError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT date, COUNT(*)
             FROM calendar_additions
             WHERE date >= ?1 AND date <= ?2
             GROUP BY date",
        )?;

        let counts = stmt
            .query_map(params![format_date(start), format_date(end)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        Ok(counts)
    }

    /// Gets the settings row
    pub fn global_config(&self) -> Result<GlobalConfig, ScheduleError> {
        Ok(GlobalConfig {
            default_zoom_link: self.default_zoom_link()?,
        })
    }
}

/// Converts a stored weekly row, or `None` (with a warning) if it is malformed.
fn weekly_entry_from_row(row: &DbWeeklySchedule) -> Option<WeeklyScheduleEntry> {
    let day = u8::try_from(row.day_of_week)
        .ok()
        .and_then(DayOfWeek::from_number);
    let Some(day) = day else {
        warn!("Skipping weekly schedule row with day_of_week {}", row.day_of_week);
        return None;
    };

    let time = match row.custom_time.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match parse_time_of_day(raw) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("Skipping weekly schedule row for {}: {}", day, e);
                return None;
            }
        },
    };

    Some(WeeklyScheduleEntry::new(day, row.enabled, time))
}

/// Converts a stored override row, or `None` (with a warning) if it is malformed.
fn override_from_row(row: &DbOverride) -> Option<DateOverride> {
    let date = match parse_date(&row.date) {
        Ok(d) => d,
        Err(e) => {
            warn!("Skipping override row: {}", e);
            return None;
        }
    };

    let time = match row.time.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match parse_time_of_day(raw) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("Skipping override row for {}: {}", row.date, e);
                return None;
            }
        },
    };

    Some(DateOverride {
        date,
        is_available: row.is_available,
        time,
    })
}

impl ScheduleStore for ScheduleDbManager {
    fn weekly_schedule(&self) -> Result<WeeklySchedule, ScheduleError> {
        Ok(self
            .weekly_schedule_rows()?
            .iter()
            .filter_map(weekly_entry_from_row)
            .collect())
    }

    fn overrides_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OverrideSet, ScheduleError> {
        if end < start {
            return Err(ScheduleError::InvalidDate {
                value: format!("{}..{}", format_date(start), format_date(end)),
            });
        }

        Ok(self
            .override_rows(start, end)?
            .iter()
            .filter_map(override_from_row)
            .collect())
    }

    fn default_zoom_link(&self) -> Result<String, ScheduleError> {
        let db = self.conn()?;
        let link: Option<String> = db
            .query_row(
                "SELECT default_zoom_link FROM office_hours_config WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(link.unwrap_or_else(|| {
            warn!("No settings row found, using fallback zoom link");
            FALLBACK_ZOOM_LINK.to_string()
        }))
    }
}
