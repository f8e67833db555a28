//! Tracking of "add to calendar" clicks.

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::DbCalendarAddition;
use crate::schedule::time::{format_date, parse_date};
use crate::schedule::ScheduleError;
use crate::server::types::{ApiErrorType, ApiJson, ApiQuery};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct CalendarAdditionBody {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// First comma-separated value of a header, if present and non-empty.
fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Client address as reported by a proxy, or `unknown`.
fn client_ip(headers: &HeaderMap) -> String {
    first_header_value(headers, "x-forwarded-for")
        .or_else(|| first_header_value(headers, "x-real-ip"))
        .unwrap_or("unknown")
        .to_string()
}

/// Resolves the requested range, defaulting to the current calendar month.
fn requested_range(
    s: &AppState,
    params: &CountQuery,
) -> Result<(NaiveDate, NaiveDate), ScheduleError> {
    let today = s.now().date_naive();
    let month_start = today.with_day0(0).unwrap_or(today);
    let month_end = month_start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(today);

    let start = params.start.as_deref().map(parse_date).transpose()?.unwrap_or(month_start);
    let end = params.end.as_deref().map(parse_date).transpose()?.unwrap_or(month_end);
    Ok((start, end))
}

/// POST /calendar_additions
///
/// Records that someone added the session on `date` to their calendar.
pub async fn post_calendar_addition(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<CalendarAdditionBody>,
) -> Response {
    info!("POST /calendar_additions (date={})", body.date);

    let result = parse_date(&body.date).and_then(|date| {
        s.schedule_db.record_calendar_addition(&DbCalendarAddition {
            date: format_date(date),
            user_ip: client_ip(&headers),
            user_agent: headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string(),
        })
    });

    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            error!("Failed to track calendar addition: {}", e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// GET /admin/calendar_additions
///
/// Returns `{date: count}` for `start..=end` (default: the current calendar month).
pub async fn get_calendar_additions(
    State(s): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<CountQuery>,
) -> Response {
    info!("GET /admin/calendar_additions (start={:?}, end={:?})", params.start, params.end);

    let result = requested_range(&s, &params)
        .and_then(|(start, end)| s.schedule_db.calendar_addition_counts(start, end));

    match result {
        Ok(counts) => (StatusCode::OK, Json(counts)).into_response(),
        Err(e) => {
            error!("Failed to count calendar additions: {}", e);
            ApiErrorType::from(e).into_response()
        }
    }
}
