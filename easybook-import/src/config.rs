//! Configuration resolution and validation for easybook-import
//!
//! RepairShopr credentials and the user-store URL resolve with ENV → TOML
//! priority. Credentials are re-resolved at the start of every import run
//! and must pass [`validate_config`] before any request is made.

use easybook_common::config::{resolve_setting, TomlConfig};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info};

pub const API_KEY_ENV: &str = "REPAIRSHOPR_API_KEY";
pub const TENANT_URL_ENV: &str = "REPAIRSHOPR_TENANT_URL";
pub const USER_STORE_URL_ENV: &str = "EASYBOOK_API_BASE_URL";

/// Missing or malformed configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("RepairShopr API key is not configured (set REPAIRSHOPR_API_KEY or [repairshopr].api_key)")]
    MissingApiKey,

    #[error("RepairShopr tenant URL is not configured (set REPAIRSHOPR_TENANT_URL or [repairshopr].tenant_url)")]
    MissingTenantUrl,

    #[error("RepairShopr tenant URL is not a valid absolute URL: {0}")]
    InvalidTenantUrl(String),

    #[error("User store URL is not configured (set EASYBOOK_API_BASE_URL or [user_store].base_url)")]
    MissingUserStoreUrl,

    #[error("User store URL is not a valid absolute URL: {0}")]
    InvalidUserStoreUrl(String),
}

/// Credentials as found in the environment / TOML, not yet validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRepairShoprConfig {
    pub api_key: Option<String>,
    pub tenant_url: Option<String>,
}

/// Validated RepairShopr credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairShoprConfig {
    pub api_key: String,
    /// Tenant API base, e.g. `https://iaircon.repairshopr.com/api/v1`
    pub tenant_url: Url,
}

impl RepairShoprConfig {
    /// Tenant URL without a trailing slash, for path joining
    pub fn base_url(&self) -> String {
        self.tenant_url.as_str().trim_end_matches('/').to_string()
    }
}

impl RawRepairShoprConfig {
    /// Resolve credentials from ENV → TOML
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        let api_key = resolve_setting(API_KEY_ENV, toml_config.repairshopr.api_key.as_deref());
        let tenant_url =
            resolve_setting(TENANT_URL_ENV, toml_config.repairshopr.tenant_url.as_deref());

        if let Some((key, source)) = &api_key {
            debug!(key_len = key.len(), source = %source, "RepairShopr API key resolved");
        }
        if let Some((url, source)) = &tenant_url {
            debug!(tenant_url = %url, source = %source, "RepairShopr tenant URL resolved");
        }

        Self {
            api_key: api_key.map(|(v, _)| v),
            tenant_url: tenant_url.map(|(v, _)| v),
        }
    }
}

fn parse_absolute_url(value: &str) -> Option<Url> {
    let url = Url::parse(value.trim()).ok()?;
    let http = matches!(url.scheme(), "http" | "https");
    (http && url.has_host()).then_some(url)
}

/// Confirm both credentials are present and the tenant URL is absolute
pub fn validate_config(raw: &RawRepairShoprConfig) -> Result<RepairShoprConfig, ConfigurationError> {
    let api_key = raw
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConfigurationError::MissingApiKey)?;

    let tenant_url = raw
        .tenant_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or(ConfigurationError::MissingTenantUrl)?;

    let tenant_url = parse_absolute_url(tenant_url)
        .ok_or_else(|| ConfigurationError::InvalidTenantUrl(tenant_url.to_string()))?;

    Ok(RepairShoprConfig {
        api_key: api_key.to_string(),
        tenant_url,
    })
}

/// Resolve and validate the internal user-store base URL
pub fn resolve_user_store_url(toml_config: &TomlConfig) -> Result<Url, ConfigurationError> {
    let (value, source) =
        resolve_setting(USER_STORE_URL_ENV, toml_config.user_store.base_url.as_deref())
            .ok_or(ConfigurationError::MissingUserStoreUrl)?;

    let url = parse_absolute_url(&value)
        .ok_or_else(|| ConfigurationError::InvalidUserStoreUrl(value.clone()))?;

    info!(url = %url, source = %source, "User store URL loaded");
    Ok(url)
}
