//! Office hours scheduling service.
//!
//! Stores a weekly schedule with per-date overrides and serves the upcoming
//! sessions, a countdown to the next one, and admin endpoints for editing both.

pub mod config;
pub mod db;
pub mod schedule;
pub mod server;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::types::AppState;

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn start_server<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on {}", addr);
    }

    let app = server::create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
