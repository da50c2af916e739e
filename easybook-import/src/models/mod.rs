//! Data models for easybook-import
//!
//! - External RepairShopr records
//! - Internal user schema
//! - Run results, progress snapshots and the session state machine

pub mod customer;
pub mod import_result;
pub mod import_session;
pub mod user;

pub use customer::{Customer, CustomerCount, CustomersPage, PageMeta, Ticket, TicketComment, TicketsPage};
pub use import_result::{ImportProgress, ImportResult, RecordError};
pub use import_session::{ImportPhase, ImportSession};
pub use user::{AmcStatus, ImportedUser, UserDraft, ValidationError};
