//! Public endpoints for upcoming sessions.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::schedule::{self, PageRequest};
use crate::server::types::{ApiErrorType, ApiQuery};
use crate::types::AppState;

/// Query parameters for `/occurrences`.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// GET /occurrences
///
/// Returns a page of upcoming sessions with the zoom link.
///
/// Query parameters:
/// - `offset` (optional, default 0)
/// - `limit` (optional, default 10, at most 100)
pub async fn get_occurrences(
    State(s): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PageQuery>,
) -> Response {
    let page = PageRequest::new(params.offset, params.limit);
    info!("GET /occurrences (offset={}, limit={})", page.offset, page.limit);

    match schedule::load_upcoming(&s.schedule_db, &s.resolver, s.now(), page) {
        Ok(upcoming) => (StatusCode::OK, Json(upcoming)).into_response(),
        Err(e) => {
            error!("Failed to resolve upcoming sessions: {}", e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// GET /occurrences/next
///
/// Returns the next session with its countdown, or `next: null`.
pub async fn get_next(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /occurrences/next");

    match schedule::load_next(&s.schedule_db, &s.resolver, s.now()) {
        Ok(next) => (StatusCode::OK, Json(next)).into_response(),
        Err(e) => {
            error!("Failed to resolve next session: {}", e);
            ApiErrorType::from(e).into_response()
        }
    }
}
