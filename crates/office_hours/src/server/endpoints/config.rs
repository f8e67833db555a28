//! Admin endpoints for the weekly schedule and global settings.
//!
//! Times travel in the admin's local timezone (`?timezone=`, default UTC) and
//! are converted using today's date.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::schedule::time::{format_local_time, parse_time_of_day};
use crate::schedule::timezone::{local_to_utc_time, parse_timezone, utc_to_local_time};
use crate::schedule::{DayOfWeek, ScheduleError, ScheduleStore, WeeklyScheduleEntry};
use crate::server::types::{ApiErrorType, ApiJson, ApiQuery};
use crate::types::AppState;

/// Query parameter shared by the admin endpoints that carry times.
#[derive(Debug, Deserialize)]
pub struct TimezoneQuery {
    pub timezone: Option<String>,
}

impl TimezoneQuery {
    /// The requested zone name, checked against the IANA database.
    pub fn validated(&self) -> Result<String, ScheduleError> {
        let tz = self.timezone.as_deref().unwrap_or("UTC");
        parse_timezone(tz)?;
        Ok(tz.trim().to_string())
    }
}

/// One day of the weekly schedule as shown to admins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayConfig {
    pub enabled: bool,
    /// Local `HH:MM`
    #[serde(default)]
    pub time: Option<String>,
}

/// Body of `GET /admin/config`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub default_zoom_link: String,
    pub weekly_schedule: BTreeMap<DayOfWeek, DayConfig>,
    pub timezone: String,
}

/// Body of `PUT /admin/config`. Days left out are not changed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default)]
    pub default_zoom_link: Option<String>,
    #[serde(default)]
    pub weekly_schedule: BTreeMap<DayOfWeek, DayConfig>,
}

/// Checks that `link` is an absolute URL.
pub fn validate_zoom_link(link: &str) -> Result<String, ScheduleError> {
    let trimmed = link.trim();
    url::Url::parse(trimmed).map_err(|e| ScheduleError::InvalidZoomLink {
        value: link.to_string(),
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}

fn read_config(s: &AppState, tz: &str) -> Result<ConfigResponse, ScheduleError> {
    let today = s.now().date_naive();
    let weekly = s.schedule_db.weekly_schedule()?;

    let weekly_schedule = weekly
        .iter()
        .map(|entry| {
            let local = utc_to_local_time(entry.time, today, tz);
            (
                entry.day,
                DayConfig {
                    enabled: entry.enabled,
                    time: Some(format_local_time(local)),
                },
            )
        })
        .collect();

    Ok(ConfigResponse {
        default_zoom_link: s.schedule_db.global_config()?.default_zoom_link,
        weekly_schedule,
        timezone: tz.to_string(),
    })
}

fn write_config(s: &AppState, tz: &str, update: ConfigUpdate) -> Result<usize, ScheduleError> {
    let today = s.now().date_naive();

    let link = update
        .default_zoom_link
        .as_deref()
        .map(validate_zoom_link)
        .transpose()?;

    let entries = update
        .weekly_schedule
        .iter()
        .map(|(day, config)| {
            let time = config
                .time
                .as_deref()
                .map(parse_time_of_day)
                .transpose()?
                .map(|local| local_to_utc_time(local, today, tz));
            Ok(WeeklyScheduleEntry::new(*day, config.enabled, time))
        })
        .collect::<Result<Vec<_>, ScheduleError>>()?;

    s.schedule_db.save_config(link.as_deref(), &entries)?;
    Ok(entries.len())
}

/// GET /admin/config
///
/// Returns the zoom link and weekly schedule with times in `timezone`.
pub async fn get_config(
    State(s): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<TimezoneQuery>,
) -> Response {
    info!("GET /admin/config (timezone={:?})", params.timezone);

    let result = params.validated().and_then(|tz| read_config(&s, &tz));
    match result {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(e) => {
            error!("Failed to read config: {}", e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// PUT /admin/config
///
/// Saves the zoom link and any weekly days given. Times are local to `timezone`;
/// a day without a time is stored at 15:00 UTC.
pub async fn put_config(
    State(s): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<TimezoneQuery>,
    ApiJson(update): ApiJson<ConfigUpdate>,
) -> Response {
    info!(
        "PUT /admin/config (timezone={:?}, days={})",
        params.timezone,
        update.weekly_schedule.len()
    );

    let result = params
        .validated()
        .and_then(|tz| write_config(&s, &tz, update));
    match result {
        Ok(days) => (
            StatusCode::OK,
            Json(json!({ "success": true, "daysUpdated": days })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to save config: {}", e);
            ApiErrorType::from(e).into_response()
        }
    }
}
