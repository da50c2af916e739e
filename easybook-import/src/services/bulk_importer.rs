//! Paginated bulk import of RepairShopr customers
//!
//! Drives the page loop: read the customer count, then fetch pages of
//! `PAGE_SIZE` until an empty page arrives, transforming and importing each
//! record, reporting progress after every page and sleeping `IMPORT_DELAY`
//! between pages.
//!
//! **Failure isolation:**
//! - A record that fails validation or import is recorded and skipped
//! - A page that fails to fetch counts as `PAGE_SIZE` failures and is skipped
//! - Configuration, count-fetch and repeated page failures end the run
//!
//! The [`ImportResult`] accumulator is local to one `run` call and returned
//! once at the end.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::RawRepairShoprConfig;
use crate::error::ImportError;
use crate::models::{Customer, ImportPhase, ImportProgress, ImportResult};
use crate::services::record_transformer::transform_customer;
use crate::services::repairshopr_client::RepairShoprClient;
use crate::types::{CustomerSource, ProgressObserver, UserSink};

/// Records requested per page
pub const PAGE_SIZE: u32 = 50;

/// Fixed throttle between page requests
pub const IMPORT_DELAY: Duration = Duration::from_millis(1000);

/// Consecutive page-fetch failures tolerated before the run is abandoned
pub const MAX_CONSECUTIVE_PAGE_FAILURES: u32 = 5;

/// How the page loop ended without a fatal error
enum LoopExit {
    Exhausted,
    Cancelled,
}

/// Bulk import orchestrator
pub struct BulkImporter<S, K> {
    source: S,
    sink: K,
}

impl<S, K> BulkImporter<S, K>
where
    S: CustomerSource,
    K: UserSink,
{
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink }
    }

    /// Run one import to completion
    ///
    /// Never returns an error: fatal failures produce `success = false` with
    /// the counts accumulated so far. `cancel` is checked before each page
    /// fetch and before (and during) each inter-page delay.
    pub async fn run(
        &self,
        observer: Option<&mut dyn ProgressObserver>,
        cancel: &CancellationToken,
    ) -> ImportResult {
        let mut silent = SilentObserver;
        let observer: &mut dyn ProgressObserver = match observer {
            Some(observer) => observer,
            None => &mut silent,
        };
        let mut result = ImportResult::new();

        tracing::info!(page_size = PAGE_SIZE, "Starting bulk customer import");

        let outcome = self.page_loop(&mut result, observer, cancel).await;

        let final_phase = match outcome {
            Ok(LoopExit::Exhausted) => {
                result.success = true;
                result.message = format!("Successfully imported {} users", result.imported_count);
                tracing::info!(
                    imported = result.imported_count,
                    failed = result.failed_count,
                    "Bulk import completed"
                );
                ImportPhase::Completed
            }
            Ok(LoopExit::Cancelled) => {
                result.success = false;
                result.message = format!(
                    "Import cancelled after importing {} users",
                    result.imported_count
                );
                tracing::warn!(
                    imported = result.imported_count,
                    failed = result.failed_count,
                    "Bulk import cancelled"
                );
                ImportPhase::Cancelled
            }
            Err(err) => {
                result.success = false;
                result.message = format!("Import failed: {}", err);
                tracing::error!(
                    error = %err,
                    imported = result.imported_count,
                    failed = result.failed_count,
                    "Bulk import failed"
                );
                ImportPhase::Failed
            }
        };

        enter_phase(observer, final_phase);
        result
    }

    async fn page_loop(
        &self,
        result: &mut ImportResult,
        observer: &mut dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<LoopExit, ImportError> {
        enter_phase(observer, ImportPhase::FetchingCount);
        let total = self
            .source
            .fetch_customer_count()
            .await
            .map_err(ImportError::CountFetch)?;

        tracing::info!(total, "Customers to import");

        let mut page: u32 = 1;
        let mut consecutive_failures: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(LoopExit::Cancelled);
            }

            enter_phase(observer, ImportPhase::FetchingPage);
            match self.source.fetch_customers_page(page, PAGE_SIZE).await {
                Ok(customers) if customers.is_empty() => {
                    tracing::debug!(page, "Empty page, pagination exhausted");
                    return Ok(LoopExit::Exhausted);
                }
                Ok(customers) => {
                    consecutive_failures = 0;

                    enter_phase(observer, ImportPhase::ProcessingRecords);
                    for customer in &customers {
                        self.import_record(customer, result).await;
                    }

                    enter_phase(observer, ImportPhase::ReportingProgress);
                    let progress = ImportProgress::compute(total, result.imported_count);
                    tracing::info!(
                        page,
                        records = customers.len(),
                        imported = result.imported_count,
                        failed = result.failed_count,
                        percentage = progress.percentage,
                        "Page processed"
                    );
                    observer.on_progress(progress);
                }
                Err(source) => {
                    let err = ImportError::PageFetch { page, source };
                    tracing::warn!(page, error = %err, "Page fetch failed, skipping page");
                    result.record_page_failure(page, PAGE_SIZE, err.to_string());

                    consecutive_failures += 1;
                    if consecutive_failures >= MAX_CONSECUTIVE_PAGE_FAILURES {
                        return Err(ImportError::PageFailuresExceeded(consecutive_failures));
                    }
                }
            }

            if cancel.is_cancelled() {
                return Ok(LoopExit::Cancelled);
            }

            enter_phase(observer, ImportPhase::Delaying);
            tokio::select! {
                _ = cancel.cancelled() => return Ok(LoopExit::Cancelled),
                _ = tokio::time::sleep(IMPORT_DELAY) => {}
            }

            page += 1;
        }
    }

    /// Transform, validate and import one record; failures are recorded
    async fn import_record(&self, customer: &Customer, result: &mut ImportResult) {
        let outcome = match transform_customer(customer) {
            Ok(user) => self
                .sink
                .import_user(&user)
                .await
                .map_err(ImportError::RecordImport),
            Err(e) => Err(ImportError::RecordValidation(e)),
        };

        match outcome {
            Ok(()) => result.record_imported(),
            Err(err) => {
                tracing::warn!(customer_id = customer.id, error = %err, "Record skipped");
                result.record_failure(customer.record_id(), err.to_string());
            }
        }
    }
}

/// Stand-in when the caller passes no observer
struct SilentObserver;

impl ProgressObserver for SilentObserver {
    fn on_progress(&mut self, _progress: ImportProgress) {}
}

fn enter_phase(observer: &mut dyn ProgressObserver, phase: ImportPhase) {
    tracing::debug!(phase = ?phase, "Import phase");
    observer.on_phase(phase);
}

/// Import every RepairShopr customer into the user store
///
/// Validates `raw` first; a configuration error ends the run before any
/// request is made.
pub async fn bulk_import_users<K: UserSink>(
    raw: &RawRepairShoprConfig,
    sink: K,
    observer: Option<&mut dyn ProgressObserver>,
    cancel: &CancellationToken,
) -> ImportResult {
    let client = match RepairShoprClient::from_raw(raw) {
        Ok(client) => client,
        Err(e) => {
            let err = match e {
                crate::services::RepairShoprError::Configuration(c) => ImportError::Configuration(c),
                other => ImportError::Unexpected(other.to_string()),
            };
            tracing::error!(error = %err, "Bulk import aborted before start");
            if let Some(observer) = observer {
                enter_phase(observer, ImportPhase::Failed);
            }
            return ImportResult::failed(format!("Import failed: {}", err));
        }
    };

    BulkImporter::new(client, sink).run(observer, cancel).await
}
