//! Import run results and progress snapshots

use serde::{Deserialize, Serialize};

/// Per-record (or per-page) failure entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    /// External record id, or `page-<n>` for a failed page fetch
    pub id: String,
    pub error: String,
}

/// Progress snapshot handed to the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub total: u64,
    /// Records imported so far
    pub current: u64,
    /// 0 - 100
    pub percentage: u8,
}

impl ImportProgress {
    /// Compute progress from the announced total and imported count
    ///
    /// `total = 0` reports 100%. When more records were imported than the
    /// count announced, `total` is raised to `current` so `current <= total`
    /// always holds.
    pub fn compute(total: u64, imported: u64) -> Self {
        let total = total.max(imported);
        let percentage = if total == 0 {
            100
        } else {
            ((imported as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
        };

        Self {
            total,
            current: imported,
            percentage,
        }
    }
}

/// Summary returned once per orchestration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub imported_count: u64,
    pub failed_count: u64,
    pub errors: Vec<RecordError>,
}

impl ImportResult {
    /// Create new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Result for a run that aborted before any work was done
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn record_imported(&mut self) {
        self.imported_count += 1;
    }

    /// Count one failed record and remember why
    pub fn record_failure(&mut self, id: impl Into<String>, error: impl Into<String>) {
        self.failed_count += 1;
        self.errors.push(RecordError {
            id: id.into(),
            error: error.into(),
        });
    }

    /// Count a whole page as failed
    pub fn record_page_failure(&mut self, page: u32, page_size: u32, error: impl Into<String>) {
        self.failed_count += u64::from(page_size);
        self.errors.push(RecordError {
            id: format!("page-{}", page),
            error: error.into(),
        });
    }
}
