//! Error types for easybook-import
//!
//! [`ImportError`] classifies failures inside an import run. Per-record and
//! per-page failures are recorded and skipped; the rest end the run early.
//! [`ApiError`] is the HTTP-facing error for the admin API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigurationError;
use crate::models::ValidationError;
use crate::services::{ImporterError, RepairShoprError};

/// Import run failure taxonomy
#[derive(Debug, Error)]
pub enum ImportError {
    /// Missing or malformed credentials (fatal, before any request)
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Initial customer count could not be read (fatal)
    #[error("Could not read customer count: {0}")]
    CountFetch(RepairShoprError),

    /// One page request failed (page counted as failed, loop continues)
    #[error("Page {page} fetch failed: {source}")]
    PageFetch {
        page: u32,
        #[source]
        source: RepairShoprError,
    },

    /// One record failed schema validation (recorded, loop continues)
    #[error("Validation failed: {0}")]
    RecordValidation(#[from] ValidationError),

    /// Import POST failed for one record (recorded, loop continues)
    #[error("Import failed: {0}")]
    RecordImport(#[from] ImporterError),

    /// Source kept failing; no empty page will ever end the loop (fatal)
    #[error("Aborted after {0} consecutive page failures")]
    PageFailuresExceeded(u32),

    /// Anything else (fatal)
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., import already running
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream service failed (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<RepairShoprError> for ApiError {
    fn from(err: RepairShoprError) -> Self {
        match err {
            RepairShoprError::Configuration(e) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
