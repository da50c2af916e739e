//! HTTP API handlers for easybook-import
//!
//! Admin surface over HTTP REST + SSE

pub mod health;
pub mod import_workflow;
pub mod repairshopr;
pub mod sse;

pub use health::health_routes;
pub use import_workflow::import_routes;
pub use repairshopr::repairshopr_routes;
pub use sse::import_event_stream;
