//! easybook-import library interface
//!
//! Bulk import of RepairShopr customers into the Easy Booking user store,
//! plus the admin HTTP API that starts, monitors and cancels import runs.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sessions;
pub mod types;

pub use crate::error::{ApiError, ApiResult, ImportError};
pub use crate::services::bulk_import_users;

use axum::Router;
use chrono::{DateTime, Utc};
use easybook_common::config::TomlConfig;
use easybook_common::events::EventBus;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::sessions::SessionRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Loaded TOML file; credentials are re-resolved from it (and the
    /// environment) on every run
    pub toml_config: Arc<TomlConfig>,
    /// Import sessions and their cancellation tokens
    pub sessions: SessionRegistry,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(event_bus: EventBus, toml_config: TomlConfig) -> Self {
        Self {
            event_bus,
            toml_config: Arc::new(toml_config),
            sessions: SessionRegistry::new(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember an error for `/health`
    pub async fn set_last_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::import_routes())
        .merge(api::repairshopr_routes())
        .route("/import/events", get(api::import_event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
