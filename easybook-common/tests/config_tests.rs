//! Configuration loading and ENV → TOML resolution tests
//!
//! Tests that manipulate environment variables are marked #[serial] so they
//! do not race each other.

use easybook_common::config::{load_toml_config, resolve_setting, SettingSource, TomlConfig};
use serial_test::serial;
use std::io::Write;

const TEST_VAR: &str = "EASYBOOK_TEST_SETTING";

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_full_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[logging]
level = "debug"

[server]
host = "0.0.0.0"
port = 6000

[repairshopr]
api_key = "rs-key"
tenant_url = "https://iaircon.repairshopr.com/api/v1"

[user_store]
base_url = "https://booking.iaircon.example"
"#
    )
    .unwrap();

    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.server.port, Some(6000));
    assert_eq!(config.repairshopr.api_key.as_deref(), Some("rs-key"));
    assert_eq!(
        config.user_store.base_url.as_deref(),
        Some("https://booking.iaircon.example")
    );
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repairshopr\napi_key = ").unwrap();

    let err = load_toml_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}

#[test]
#[serial]
fn test_environment_overrides_toml() {
    std::env::set_var(TEST_VAR, "env-value");

    let resolved = resolve_setting(TEST_VAR, Some("toml-value"));
    assert_eq!(
        resolved,
        Some(("env-value".to_string(), SettingSource::Environment))
    );

    std::env::remove_var(TEST_VAR);
}

#[test]
#[serial]
fn test_toml_fallback_when_env_blank() {
    std::env::set_var(TEST_VAR, "   ");

    let resolved = resolve_setting(TEST_VAR, Some("toml-value"));
    assert_eq!(resolved, Some(("toml-value".to_string(), SettingSource::Toml)));

    std::env::remove_var(TEST_VAR);
}

#[test]
#[serial]
fn test_nothing_configured() {
    std::env::remove_var(TEST_VAR);
    assert_eq!(resolve_setting(TEST_VAR, None), None);
    assert_eq!(resolve_setting(TEST_VAR, Some("")), None);
}
