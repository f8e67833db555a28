//! Admin endpoints for single-date overrides.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::config::TimezoneQuery;
use crate::schedule::time::{
    format_date, format_local_time, format_utc_time, parse_date, parse_time_of_day,
};
use crate::schedule::timezone::{local_to_utc_time, parse_timezone, utc_to_local_time};
use crate::schedule::{DateOverride, ScheduleError, ScheduleStore};
use crate::server::types::{ApiErrorType, ApiJson, ApiPath, ApiQuery};
use crate::types::AppState;

/// Query parameters for `GET /admin/overrides`.
#[derive(Debug, Deserialize)]
pub struct OverrideRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
}

/// Body of `PUT /admin/overrides/:date`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideUpdate {
    /// Local `HH:MM`; omitted or null leaves the override without a time
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// An override as shown to admins.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideView {
    pub date: String,
    pub is_available: bool,
    /// Local `HH:MM`
    pub time: Option<String>,
    /// Stored `HH:MM:SS`
    pub utc_time: Option<String>,
}

impl OverrideView {
    fn new(o: &DateOverride, tz: &str) -> Self {
        Self {
            date: format_date(o.date),
            is_available: o.is_available,
            time: o
                .time
                .map(|t| format_local_time(utc_to_local_time(t, o.date, tz))),
            utc_time: o.time.map(format_utc_time),
        }
    }
}

/// Resolves the requested range, defaulting to the resolver's horizon.
fn requested_range(
    s: &AppState,
    params: &OverrideRangeQuery,
) -> Result<(NaiveDate, NaiveDate), ScheduleError> {
    let today = s.now().date_naive();
    let start = params.start.as_deref().map(parse_date).transpose()?.unwrap_or(today);
    let end = match params.end.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => start
            .checked_add_days(Days::new(u64::from(s.resolver.horizon_days().saturating_sub(1))))
            .unwrap_or(start),
    };
    Ok((start, end))
}

fn list_overrides(
    s: &AppState,
    params: &OverrideRangeQuery,
) -> Result<Vec<OverrideView>, ScheduleError> {
    let tz = params.timezone.as_deref().unwrap_or("UTC");
    parse_timezone(tz)?;
    let (start, end) = requested_range(s, params)?;

    Ok(s
        .schedule_db
        .overrides_between(start, end)?
        .iter()
        .map(|o| OverrideView::new(o, tz))
        .collect())
}

/// Builds the stored override; the local time is converted with the override's own date.
fn override_from_update(
    date: &str,
    tz: &str,
    update: &OverrideUpdate,
) -> Result<DateOverride, ScheduleError> {
    let date = parse_date(date)?;
    let time = update
        .time
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(parse_time_of_day)
        .transpose()?
        .map(|local| local_to_utc_time(local, date, tz));

    if update.is_available && time.is_none() {
        warn!(
            "Override for {} is available but has no time; no session will be shown that day",
            format_date(date)
        );
    }

    Ok(DateOverride {
        date,
        is_available: update.is_available,
        time,
    })
}

/// GET /admin/overrides
///
/// Query parameters:
/// - `start`, `end` (optional `YYYY-MM-DD`, inclusive; default is the resolver horizon from today)
/// - `timezone` (optional, default UTC)
pub async fn get_overrides(
    State(s): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<OverrideRangeQuery>,
) -> Response {
    info!("GET /admin/overrides (start={:?}, end={:?})", params.start, params.end);

    match list_overrides(&s, &params) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(e) => {
            error!("Failed to list overrides: {}", e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// PUT /admin/overrides/:date
///
/// Creates or replaces the override for `date`.
pub async fn put_override(
    ApiPath(date): ApiPath<String>,
    State(s): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<TimezoneQuery>,
    ApiJson(update): ApiJson<OverrideUpdate>,
) -> Response {
    info!("PUT /admin/overrides/{}", date);

    let result = params.validated().and_then(|tz| {
        let o = override_from_update(&date, &tz, &update)?;
        s.schedule_db.upsert_override(&o)?;
        Ok(OverrideView::new(&o, &tz))
    });

    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            error!("Failed to save override for {}: {}", date, e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// DELETE /admin/overrides/:date
///
/// Removes the override so the date follows the weekly schedule again.
pub async fn delete_override(
    ApiPath(date): ApiPath<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("DELETE /admin/overrides/{}", date);

    let result = parse_date(&date).and_then(|d| {
        if s.schedule_db.delete_override(d)? {
            Ok(())
        } else {
            Err(ScheduleError::NotFound {
                what: format!("override for {}", date),
            })
        }
    });

    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            warn!("Failed to delete override for {}: {}", date, e);
            ApiErrorType::from(e).into_response()
        }
    }
}
