//! RepairShopr diagnostics endpoints
//!
//! Connection test and per-customer service-report preview. Both resolve
//! credentials fresh on every request.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{
    config::RawRepairShoprConfig,
    error::ApiResult,
    services::{extract_service_report, RepairShoprClient, RepairShoprError},
    AppState,
};

/// POST /import/repairshopr/test-connection response
#[derive(Debug, Serialize)]
pub struct TestConnectionResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_count: Option<u64>,
    /// Failure reason when not connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /import/repairshopr/customers/{id}/service-report response
#[derive(Debug, Serialize)]
pub struct ServiceReportResponse {
    pub customer_id: i64,
    pub ticket_count: usize,
    /// Empty when the customer has no ticket comments
    pub service_report: String,
}

fn client(state: &AppState) -> Result<RepairShoprClient, RepairShoprError> {
    RepairShoprClient::from_raw(&RawRepairShoprConfig::resolve(&state.toml_config))
}

/// POST /import/repairshopr/test-connection
///
/// Missing credentials are a 400; an unreachable tenant or rejected key is
/// reported in the body with `connected: false`.
pub async fn test_connection(
    State(state): State<AppState>,
) -> ApiResult<Json<TestConnectionResponse>> {
    let client = client(&state)?;

    let response = match client.test_connection().await {
        Ok(status) => TestConnectionResponse {
            connected: status.connected,
            customer_count: status.customer_count,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "RepairShopr connection test failed");
            state.set_last_error(e.to_string()).await;
            TestConnectionResponse {
                connected: false,
                customer_count: None,
                message: Some(e.to_string()),
            }
        }
    };

    Ok(Json(response))
}

/// GET /import/repairshopr/customers/{id}/service-report
pub async fn customer_service_report(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> ApiResult<Json<ServiceReportResponse>> {
    let client = client(&state)?;
    let tickets = client.fetch_customer_tickets(customer_id).await?;

    Ok(Json(ServiceReportResponse {
        customer_id,
        ticket_count: tickets.len(),
        service_report: extract_service_report(&tickets),
    }))
}

/// Build RepairShopr diagnostics routes
pub fn repairshopr_routes() -> Router<AppState> {
    Router::new()
        .route("/import/repairshopr/test-connection", post(test_connection))
        .route(
            "/import/repairshopr/customers/:customer_id/service-report",
            get(customer_service_report),
        )
}
