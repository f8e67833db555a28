use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use office_hours::config::{ServerConfig, CONFIG_PATH_ENV};
use office_hours::server::AdminGate;
use office_hours::start_server;
use office_hours::types::AppState;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Config path from the first argument, then the environment.
fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map(PathBuf::from)
}

fn load_config() -> anyhow::Result<ServerConfig> {
    match config_path() {
        Some(path) if path.exists() => ServerConfig::load_from_file(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        Some(path) => {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(ServerConfig::default())
        }
        None => {
            info!("No config file given, using defaults");
            Ok(ServerConfig::default())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "office_hours=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    let state = AppState::from_config(&config)
        .with_context(|| format!("opening database {}", config.database_path))?;

    if state.admin_gate == AdminGate::Open {
        warn!("No admin_token configured; admin routes are open");
    }

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    info!("Starting office hours server");
    start_server(listener, Arc::new(state), shutdown_signal()).await?;
    Ok(())
}
