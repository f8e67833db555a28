use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::schedule::ScheduleError;

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiErrorType {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, details): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            details,
        }
    }
}

impl From<ScheduleError> for ApiErrorType {
    fn from(err: ScheduleError) -> Self {
        let message = match &err {
            ScheduleError::DataUnavailable { .. } => "Could not load schedule",
            ScheduleError::InvalidTimeFormat { .. } => "Invalid time",
            ScheduleError::InvalidTimezone { .. } => "Invalid timezone",
            ScheduleError::InvalidDate { .. } => "Invalid date",
            ScheduleError::InvalidZoomLink { .. } => "Invalid zoom link",
            ScheduleError::NotFound { .. } => "Not found",
        };
        let status = match &err {
            ScheduleError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ScheduleError::NotFound { .. } => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self::from((status, message, Some(err.to_string())))
    }
}

impl From<QueryRejection> for ApiErrorType {
    fn from(rejection: QueryRejection) -> Self {
        Self::from((StatusCode::BAD_REQUEST, "Invalid query", Some(rejection.body_text())))
    }
}

impl From<PathRejection> for ApiErrorType {
    fn from(rejection: PathRejection) -> Self {
        Self::from((StatusCode::BAD_REQUEST, "Invalid path", Some(rejection.body_text())))
    }
}

impl From<JsonRejection> for ApiErrorType {
    fn from(rejection: JsonRejection) -> Self {
        Self::from((StatusCode::BAD_REQUEST, "Invalid body", Some(rejection.body_text())))
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// `Query` whose rejection is an [`ApiErrorType`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiErrorType))]
pub struct ApiQuery<T>(pub T);

/// `Path` whose rejection is an [`ApiErrorType`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiErrorType))]
pub struct ApiPath<T>(pub T);

/// `Json` whose rejection is an [`ApiErrorType`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErrorType))]
pub struct ApiJson<T>(pub T);
