//! Configuration loading and setting resolution
//!
//! Settings resolve with ENV → TOML priority. The TOML file is optional; a
//! missing file yields defaults so a service can run purely from environment
//! variables.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Logging section of the TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// HTTP listener section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// RepairShopr credentials section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepairShoprSection {
    pub api_key: Option<String>,
    pub tenant_url: Option<String>,
}

/// Internal user store section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStoreSection {
    pub base_url: Option<String>,
}

/// Contents of `import.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub repairshopr: RepairShoprSection,
    #[serde(default)]
    pub user_store: UserStoreSection,
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    Environment,
    Toml,
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingSource::Environment => write!(f, "environment"),
            SettingSource::Toml => write!(f, "TOML"),
        }
    }
}

/// Default config file location: `<config_dir>/easybook/<file_name>`
pub fn default_config_path(file_name: &str) -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("easybook").join(file_name))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Load a TOML config file, falling back to defaults when the file is absent
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Setting value is usable (non-empty, non-whitespace)
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Resolve one setting from ENV → TOML
///
/// Blank values are treated as absent. When both sources provide a value a
/// warning is logged and the environment wins.
pub fn resolve_setting(
    env_var: &str,
    toml_value: Option<&str>,
) -> Option<(String, SettingSource)> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_present(v));
    let toml_value = toml_value.filter(|v| is_present(v));

    match (env_value, toml_value) {
        (Some(env), Some(_)) => {
            warn!(
                setting = env_var,
                "Setting found in environment and TOML. Using environment (highest priority)."
            );
            Some((env, SettingSource::Environment))
        }
        (Some(env), None) => Some((env, SettingSource::Environment)),
        (None, Some(toml)) => Some((toml.to_string(), SettingSource::Toml)),
        (None, None) => None,
    }
}
