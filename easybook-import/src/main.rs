//! easybook-import - RepairShopr bulk import microservice
//!
//! Serves the admin API that pages through RepairShopr customers and imports
//! them into the Easy Booking user store.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use easybook_common::config::{default_config_path, load_toml_config};
use easybook_common::events::EventBus;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use easybook_import::AppState;

const DEFAULT_PORT: u16 = 5780;
const DEFAULT_HOST: &str = "127.0.0.1";
const CONFIG_FILE_NAME: &str = "import.toml";

/// Command-line arguments for easybook-import
#[derive(Parser, Debug)]
#[command(name = "easybook-import")]
#[command(about = "RepairShopr customer import microservice for Easy Booking")]
#[command(version)]
struct Args {
    /// Port to listen on (falls back to [server].port, then 5780)
    #[arg(short, long, env = "EASYBOOK_IMPORT_PORT")]
    port: Option<u16>,

    /// Address to bind (falls back to [server].host, then 127.0.0.1)
    #[arg(long, env = "EASYBOOK_IMPORT_HOST")]
    host: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path(CONFIG_FILE_NAME)?,
    };
    let toml_config = load_toml_config(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    // Initialize tracing
    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("easybook_import={level},easybook_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting easybook-import (RepairShopr import) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Config file: {}", config_path.display());

    let port = args
        .port
        .or(toml_config.server.port)
        .unwrap_or(DEFAULT_PORT);
    let host = args
        .host
        .or_else(|| toml_config.server.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    // Fail fast on a missing user store; RepairShopr credentials are checked per run
    let user_store_url = easybook_import::config::resolve_user_store_url(&toml_config)?;
    info!("User store: {}", user_store_url);

    let event_bus = EventBus::new(100);
    let state = AppState::new(event_bus, toml_config);
    let app = easybook_import::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
