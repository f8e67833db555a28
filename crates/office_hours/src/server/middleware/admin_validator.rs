use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Decides whether a request may reach the admin routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminGate {
    /// Every request is let through.
    Open,
    /// Requests must carry `Authorization: Bearer <token>`.
    BearerToken(String),
}

impl AdminGate {
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(t) => AdminGate::BearerToken(t),
            None => AdminGate::Open,
        }
    }

    pub fn permits(&self, headers: &HeaderMap) -> bool {
        match self {
            AdminGate::Open => true,
            AdminGate::BearerToken(expected) => headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .is_some_and(|given| given.trim() == expected),
        }
    }
}

/// Rejects requests the admin gate does not permit.
pub async fn require_admin(
    State(s): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if !s.admin_gate.permits(req.headers()) {
        warn!("Rejected admin request to {}", req.uri().path());
        return ApiErrorType::from((StatusCode::UNAUTHORIZED, "Unauthorized", None)).into_response();
    }

    next.run(req).await
}
