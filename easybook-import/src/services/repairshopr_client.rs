//! RepairShopr API client
//!
//! Reads customers (with nested tickets) and tickets from a RepairShopr
//! tenant. Every request carries the tenant API key as a bearer token.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::{validate_config, ConfigurationError, RawRepairShoprConfig, RepairShoprConfig};
use crate::models::{Customer, CustomerCount, CustomersPage, Ticket, TicketsPage};
use crate::services::retry::with_default_retry;
use crate::types::CustomerSource;

const USER_AGENT: &str = concat!("iAircon-EasyBooking/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// RepairShopr client errors
#[derive(Debug, Error)]
pub enum RepairShoprError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid API key")]
    Unauthorized,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Outcome of a successful connection test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    /// Customer total reported by the tenant, when it sends pagination meta
    pub customer_count: Option<u64>,
}

/// RepairShopr API client
pub struct RepairShoprClient {
    http_client: reqwest::Client,
    config: RepairShoprConfig,
}

impl RepairShoprClient {
    pub fn new(config: RepairShoprConfig) -> Result<Self, RepairShoprError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RepairShoprError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Validate raw credentials and build a client
    pub fn from_raw(raw: &RawRepairShoprConfig) -> Result<Self, RepairShoprError> {
        Self::new(validate_config(raw)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RepairShoprError> {
        let url = format!("{}{}", self.config.base_url(), path);

        tracing::debug!(url = %url, "Querying RepairShopr API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| RepairShoprError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RepairShoprError::Unauthorized);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RepairShoprError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| RepairShoprError::ParseError(e.to_string()))
    }

    /// Confirm the tenant is reachable and the key is accepted
    ///
    /// Requests a single customer, retrying transient failures.
    pub async fn test_connection(&self) -> Result<ConnectionStatus, RepairShoprError> {
        let query = [("page", "1".to_string()), ("per_page", "1".to_string())];
        let page: CustomersPage =
            with_default_retry("connection test", || self.get_json("/customers", &query)).await?;

        let customer_count = page.meta.and_then(|m| m.total_entries);
        tracing::info!(
            tenant = %self.config.tenant_url,
            customer_count = ?customer_count,
            "RepairShopr connection test succeeded"
        );

        Ok(ConnectionStatus {
            connected: true,
            customer_count,
        })
    }

    /// Tickets for one customer, retrying transient failures
    pub async fn fetch_customer_tickets(
        &self,
        customer_id: i64,
    ) -> Result<Vec<Ticket>, RepairShoprError> {
        let query = [("customer_id", customer_id.to_string())];
        let page: TicketsPage =
            with_default_retry("ticket fetch", || self.get_json("/tickets", &query)).await?;

        tracing::debug!(
            customer_id,
            ticket_count = page.tickets.len(),
            "Retrieved tickets from RepairShopr"
        );

        Ok(page.tickets)
    }
}

#[async_trait::async_trait]
impl CustomerSource for RepairShoprClient {
    async fn fetch_customer_count(&self) -> Result<u64, RepairShoprError> {
        let count: CustomerCount = self.get_json("/customers/count", &[]).await?;
        tracing::info!(count = count.count, "Retrieved customer count from RepairShopr");
        Ok(count.count)
    }

    async fn fetch_customers_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Customer>, RepairShoprError> {
        let query = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("include_tickets", "true".to_string()),
        ];

        let response: CustomersPage = self.get_json("/customers", &query).await?;

        tracing::debug!(
            page,
            customer_count = response.customers.len(),
            "Retrieved customer page from RepairShopr"
        );

        Ok(response.customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> RepairShoprClient {
        RepairShoprClient::from_raw(&RawRepairShoprConfig {
            api_key: Some("test-api-key".to_string()),
            tenant_url: Some(base_url.to_string()),
        })
        .unwrap()
    }

    #[test]
    fn test_from_raw_rejects_missing_key() {
        let result = RepairShoprClient::from_raw(&RawRepairShoprConfig {
            api_key: None,
            tenant_url: Some("https://iaircon.repairshopr.com/api/v1".to_string()),
        });
        assert!(matches!(
            result,
            Err(RepairShoprError::Configuration(ConfigurationError::MissingApiKey))
        ));
    }

    #[tokio::test]
    async fn test_fetch_count_sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/customers/count"))
            .and(header("authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "count": 120 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert_eq!(client.fetch_customer_count().await.unwrap(), 120);
    }

    #[tokio::test]
    async fn test_fetch_page_passes_pagination() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/customers"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "50"))
            .and(query_param("include_tickets", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "customers": [
                    { "id": 1, "firstname": "Ahmad", "lastname": "Ismail", "email": "ahmad@example.com" },
                    { "id": 2, "firstname": "Mei", "lastname": "Lim AMC", "email": "mei@example.com" }
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let customers = client.fetch_customers_page(2, 50).await.unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[1].lastname.as_deref(), Some("Lim AMC"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/customers/count"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.fetch_customer_count().await.unwrap_err();
        assert!(matches!(err, RepairShoprError::Unauthorized));
    }

    #[tokio::test]
    async fn test_server_error_carries_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.fetch_customers_page(1, 50).await.unwrap_err();
        assert!(matches!(err, RepairShoprError::ApiError(502, ref body) if body == "bad gateway"));
    }

    #[tokio::test]
    async fn test_connection_reports_customer_total() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/customers"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "customers": [{ "id": 1 }],
                "meta": { "total_pages": 250, "total_entries": 250, "per_page": 1, "page": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let status = client.test_connection().await.unwrap();
        assert_eq!(
            status,
            ConnectionStatus {
                connected: true,
                customer_count: Some(250),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_tickets() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(query_param("customer_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tickets": [{ "id": 9, "comments": [{ "body": "Replaced capacitor" }] }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let tickets = client.fetch_customer_tickets(42).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, 9);
    }
}
