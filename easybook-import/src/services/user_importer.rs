//! Internal user-store import client
//!
//! Posts validated records to `POST /api/users/import` tagged with their
//! source system.

use reqwest::Url;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::ImportedUser;
use crate::types::UserSink;

const IMPORT_PATH: &str = "/api/users/import";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source tag attached to every record imported from RepairShopr
pub const REPAIRSHOPR_SOURCE: &str = "repairshopr";

/// User-store import errors
#[derive(Debug, Error)]
pub enum ImporterError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Import rejected ({0}): {1}")]
    Rejected(u16, String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportRequest<'a> {
    source: &'a str,
    user_data: &'a ImportedUser,
}

/// User-store import client
pub struct UserImporter {
    http_client: reqwest::Client,
    endpoint: String,
    source: String,
}

impl UserImporter {
    pub fn new(base_url: &Url) -> Result<Self, ImporterError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ImporterError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", base_url.as_str().trim_end_matches('/'), IMPORT_PATH),
            source: REPAIRSHOPR_SOURCE.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl UserSink for UserImporter {
    async fn import_user(&self, user: &ImportedUser) -> Result<(), ImporterError> {
        let request = ImportRequest {
            source: &self.source,
            user_data: user,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ImporterError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImporterError::Rejected(status.as_u16(), body));
        }

        tracing::debug!(email = %user.email, "User imported");
        Ok(())
    }
}
