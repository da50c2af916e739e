//! Import run state machine
//!
//! A run moves Idle → FetchingCount → {FetchingPage → ProcessingRecords →
//! ReportingProgress → Delaying}* → Completed | Failed | Cancelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ImportProgress, ImportResult};

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportPhase {
    Idle,
    FetchingCount,
    FetchingPage,
    ProcessingRecords,
    ReportingProgress,
    /// Inter-page throttle
    Delaying,
    /// Pagination exhausted
    Completed,
    /// Fatal error (configuration, count fetch, repeated page failures)
    Failed,
    /// Stopped by an admin cancel request
    Cancelled,
}

impl ImportPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ImportPhase::Completed | ImportPhase::Failed | ImportPhase::Cancelled
        )
    }
}

/// Admin-visible record of one import run (in-memory only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    pub session_id: Uuid,

    pub state: ImportPhase,

    /// External system being imported from
    pub source: String,

    /// Latest progress snapshot, None until the first page completes
    pub progress: Option<ImportProgress>,

    /// Final summary once the run is terminal
    pub result: Option<ImportResult>,

    pub started_at: DateTime<Utc>,

    pub ended_at: Option<DateTime<Utc>>,
}

impl ImportSession {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: ImportPhase::Idle,
            source: source.into(),
            progress: None,
            result: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state; terminal states stamp the end time
    pub fn transition_to(&mut self, new_state: ImportPhase) {
        self.state = new_state;
        if new_state.is_terminal() && self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Record the final result and move to the matching terminal state
    pub fn finish(&mut self, result: ImportResult, cancelled: bool) {
        let terminal = if cancelled {
            ImportPhase::Cancelled
        } else if result.success {
            ImportPhase::Completed
        } else {
            ImportPhase::Failed
        };
        self.result = Some(result);
        self.transition_to(terminal);
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds().max(0) as u64
    }
}
