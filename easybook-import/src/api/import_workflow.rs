//! Import workflow API handlers
//!
//! POST /import/repairshopr/start, GET /import/status, POST /import/cancel

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use easybook_common::events::{EventBus, ImportEvent};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::{resolve_user_store_url, RawRepairShoprConfig},
    error::{ApiError, ApiResult},
    models::{ImportPhase, ImportProgress, ImportResult, ImportSession},
    services::{bulk_import_users, UserImporter, REPAIRSHOPR_SOURCE},
    sessions::SessionRegistry,
    types::ProgressObserver,
    AppState,
};

/// POST /import/repairshopr/start response
#[derive(Debug, Serialize)]
pub struct StartImportResponse {
    pub session_id: Uuid,
    pub state: ImportPhase,
    pub source: String,
    pub started_at: DateTime<Utc>,
}

/// GET /import/status response
#[derive(Debug, Serialize)]
pub struct ImportStatusResponse {
    pub session_id: Uuid,
    pub state: ImportPhase,
    pub source: String,
    pub progress: Option<ImportProgress>,
    /// Present once the run is terminal
    pub result: Option<ImportResult>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: u64,
}

/// POST /import/cancel response
#[derive(Debug, Serialize)]
pub struct CancelImportResponse {
    pub session_id: Uuid,
    /// State when the request arrived; the run reaches CANCELLED shortly after
    pub state: ImportPhase,
    pub imported_so_far: u64,
    pub requested_at: DateTime<Utc>,
}

/// POST /import/repairshopr/start
///
/// Begin an import run in the background. Returns 202 Accepted with the
/// session ID, or 409 while another run is active.
pub async fn start_repairshopr_import(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<StartImportResponse>)> {
    let user_store_url = resolve_user_store_url(&state.toml_config)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let importer =
        UserImporter::new(&user_store_url).map_err(|e| ApiError::Internal(e.to_string()))?;

    let session = ImportSession::new(REPAIRSHOPR_SOURCE);
    let session_id = session.session_id;
    let response = StartImportResponse {
        session_id,
        state: session.state,
        source: session.source.clone(),
        started_at: session.started_at,
    };

    let cancel = state.sessions.try_register(session).map_err(|active| {
        ApiError::Conflict(format!("Import session already running: {}", active))
    })?;

    tracing::info!(session_id = %session_id, source = REPAIRSHOPR_SOURCE, "Import session started");

    state.event_bus.emit_lossy(ImportEvent::ImportSessionStarted {
        session_id,
        source: REPAIRSHOPR_SOURCE.to_string(),
        timestamp: Utc::now(),
    });

    let state_clone = state.clone();
    tokio::spawn(async move {
        tracing::info!(session_id = %session_id, "Background import task started");
        execute_import(state_clone, session_id, importer, cancel).await;
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /import/status/{session_id}
pub async fn get_import_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<ImportStatusResponse>> {
    let session = state.sessions.load(session_id).ok_or_else(|| {
        ApiError::NotFound(format!("Import session not found: {}", session_id))
    })?;

    tracing::debug!(session_id = %session_id, state = ?session.state, "Status query");

    let elapsed_seconds = session.elapsed_seconds();
    Ok(Json(ImportStatusResponse {
        session_id: session.session_id,
        state: session.state,
        source: session.source,
        progress: session.progress,
        result: session.result,
        started_at: session.started_at,
        ended_at: session.ended_at,
        elapsed_seconds,
    }))
}

/// POST /import/cancel/{session_id}
///
/// Signals the run's cancellation token. The run stops before its next page
/// fetch or during its inter-page delay.
pub async fn cancel_import(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<CancelImportResponse>> {
    let session = state.sessions.load(session_id).ok_or_else(|| {
        ApiError::NotFound(format!("Import session not found: {}", session_id))
    })?;

    if session.is_terminal() {
        return Err(ApiError::BadRequest(format!(
            "Import session already in terminal state: {:?}",
            session.state
        )));
    }

    let session = state.sessions.request_cancel(session_id).ok_or_else(|| {
        ApiError::NotFound(format!("Import session not found: {}", session_id))
    })?;

    tracing::info!(session_id = %session_id, "Import cancellation requested");

    Ok(Json(CancelImportResponse {
        session_id,
        state: session.state,
        imported_so_far: session.progress.map(|p| p.current).unwrap_or(0),
        requested_at: Utc::now(),
    }))
}

/// Mirrors orchestrator progress into the session and the event bus
struct SessionObserver {
    sessions: SessionRegistry,
    event_bus: EventBus,
    session_id: Uuid,
    /// Terminal phase reported by the run
    terminal: Option<ImportPhase>,
}

impl ProgressObserver for SessionObserver {
    fn on_progress(&mut self, progress: ImportProgress) {
        self.sessions
            .update(self.session_id, |s| s.progress = Some(progress));

        self.event_bus.emit_lossy(ImportEvent::ImportProgressUpdate {
            session_id: self.session_id,
            total: progress.total,
            current: progress.current,
            percentage: progress.percentage,
            timestamp: Utc::now(),
        });
    }

    fn on_phase(&mut self, phase: ImportPhase) {
        // Terminal state is set together with the result in `execute_import`
        if phase.is_terminal() {
            self.terminal = Some(phase);
        } else {
            self.sessions
                .update(self.session_id, |s| s.transition_to(phase));
        }
    }
}

/// Background task for one import run
async fn execute_import(
    state: AppState,
    session_id: Uuid,
    importer: UserImporter,
    cancel: CancellationToken,
) {
    let raw = RawRepairShoprConfig::resolve(&state.toml_config);
    let mut observer = SessionObserver {
        sessions: state.sessions.clone(),
        event_bus: state.event_bus.clone(),
        session_id,
        terminal: None,
    };

    let result = bulk_import_users(&raw, importer, Some(&mut observer), &cancel).await;
    let final_phase = observer.terminal.unwrap_or(if result.success {
        ImportPhase::Completed
    } else {
        ImportPhase::Failed
    });
    let cancelled = final_phase == ImportPhase::Cancelled;

    let timestamp = Utc::now();
    let event = if cancelled {
        ImportEvent::ImportSessionCancelled {
            session_id,
            imported_count: result.imported_count,
            failed_count: result.failed_count,
            timestamp,
        }
    } else if result.success {
        ImportEvent::ImportSessionCompleted {
            session_id,
            imported_count: result.imported_count,
            failed_count: result.failed_count,
            message: result.message.clone(),
            timestamp,
        }
    } else {
        ImportEvent::ImportSessionFailed {
            session_id,
            imported_count: result.imported_count,
            failed_count: result.failed_count,
            message: result.message.clone(),
            timestamp,
        }
    };

    if !result.success && !cancelled {
        tracing::error!(session_id = %session_id, message = %result.message, "Import session failed");
        state.set_last_error(result.message.clone()).await;
    } else {
        tracing::info!(
            session_id = %session_id,
            imported = result.imported_count,
            failed = result.failed_count,
            cancelled,
            "Import session finished"
        );
    }

    state
        .sessions
        .update(session_id, |s| s.finish(result, cancelled));
    state.event_bus.emit_lossy(event);
}

/// Build import workflow routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import/repairshopr/start", post(start_repairshopr_import))
        .route("/import/status/:session_id", get(get_import_status))
        .route("/import/cancel/:session_id", post(cancel_import))
}
