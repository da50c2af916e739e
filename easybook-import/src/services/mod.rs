//! Service modules for the bulk customer import
//!
//! - HTTP clients for RepairShopr and the internal user store
//! - Record transformation and validation
//! - Retry wrapper and the paginated import orchestrator

pub mod bulk_importer;
pub mod record_transformer;
pub mod repairshopr_client;
pub mod retry;
pub mod user_importer;

pub use bulk_importer::{bulk_import_users, BulkImporter, IMPORT_DELAY, PAGE_SIZE};
pub use record_transformer::{derive_amc_status, extract_service_report, transform_customer};
pub use repairshopr_client::{ConnectionStatus, RepairShoprClient, RepairShoprError};
pub use retry::{with_default_retry, with_retry};
pub use user_importer::{ImporterError, UserImporter, REPAIRSHOPR_SOURCE};
