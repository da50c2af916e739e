//! Seams between the import orchestrator and the outside world
//!
//! The orchestrator drives a [`CustomerSource`] (the external CRM) and a
//! [`UserSink`] (the internal user store). Production code uses the HTTP
//! clients in `services`; tests substitute in-memory implementations.

use crate::models::{Customer, ImportPhase, ImportProgress, ImportedUser};
use crate::services::{ImporterError, RepairShoprError};

/// Paginated source of external customer records
#[async_trait::async_trait]
pub trait CustomerSource: Send + Sync {
    /// Total number of customers the source will page through
    async fn fetch_customer_count(&self) -> Result<u64, RepairShoprError>;

    /// One page of customers (1-based) with nested tickets
    ///
    /// An empty page signals that pagination is exhausted.
    async fn fetch_customers_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Customer>, RepairShoprError>;
}

/// Destination for validated user records
#[async_trait::async_trait]
pub trait UserSink: Send + Sync {
    /// Import one validated record
    async fn import_user(&self, user: &ImportedUser) -> Result<(), ImporterError>;
}

/// Receives progress from a running import
///
/// Called synchronously from the import loop; implementations must not block.
/// Any `FnMut(ImportProgress)` closure is an observer.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, progress: ImportProgress);

    /// Orchestrator phase changed
    fn on_phase(&mut self, _phase: ImportPhase) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(ImportProgress) + Send,
{
    fn on_progress(&mut self, progress: ImportProgress) {
        self(progress)
    }
}
