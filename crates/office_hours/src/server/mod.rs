use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware as mw, Router};
use tower_http::trace::TraceLayer;

use crate::server::endpoints::{calendar, config, occurrences, overrides, status};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
pub(crate) mod types;

pub use middleware::admin_validator::AdminGate;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Router whose endpoints require the admin gate
    let admin_router = Router::new()
        .route("/config", get(config::get_config).put(config::put_config))
        .route("/overrides", get(overrides::get_overrides))
        .route(
            "/overrides/:date",
            put(overrides::put_override).delete(overrides::delete_override),
        )
        .route("/calendar_additions", get(calendar::get_calendar_additions))
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            admin_validator::require_admin,
        ));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/occurrences", get(occurrences::get_occurrences))
        .route("/occurrences/next", get(occurrences::get_next))
        .route("/calendar_additions", post(calendar::post_calendar_addition))
        .nest("/admin", admin_router)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
