//! Office hour scheduling: the weekly template, per-date overrides, and the
//! resolution of both into concrete upcoming sessions.
//!
//! All stored times are UTC. Timezones only appear at the edges, when an admin
//! enters or views local times (see [`timezone`]).

pub mod countdown;
pub mod error;
pub mod resolver;
pub mod store;
pub mod time;
pub mod timezone;
mod types;

pub use countdown::{evaluate, Remaining, SessionStatus};
pub use error::ScheduleError;
pub use resolver::{OccurrencePage, OccurrenceResolver, PageRequest, UntimedOverride};
pub use store::{load_next, load_upcoming, NextSession, ScheduleStore, UpcomingSchedule};
pub use types::*;
