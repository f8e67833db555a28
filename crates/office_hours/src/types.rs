use chrono::{DateTime, Utc};

use crate::config::ServerConfig;
use crate::db::ScheduleDbManager;
use crate::schedule::{OccurrenceResolver, ScheduleError};
use crate::server::AdminGate;

/// Source of the current instant.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    /// Always reports the same instant. Used by tests.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// State shared by every request handler.
pub struct AppState {
    /// Durable store for the schedule, overrides, settings and calendar tracking
    pub schedule_db: ScheduleDbManager,
    /// Turns the stored schedule into upcoming sessions
    pub resolver: OccurrenceResolver,
    /// Decides whether a request may use the admin routes
    pub admin_gate: AdminGate,
    pub clock: Clock,
}

impl AppState {
    /// Opens the database named in `config` and seeds the settings row if empty.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ScheduleError> {
        let schedule_db = ScheduleDbManager::new(&config.database_path)?;
        schedule_db.seed_default_zoom_link(&config.default_zoom_link)?;

        Ok(Self {
            schedule_db,
            resolver: OccurrenceResolver::new(config.horizon_days),
            admin_gate: AdminGate::from_token(config.admin_token.clone()),
            clock: Clock::System,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
