//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use pgsafe_core::WrapperGate;
use pgsafe_domain::PgSafeError;
use pgsafe_infra::config;
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let path = write_config(
        r#"{
            "database": {
                "url": "postgres://migrator@db.internal:5432/app",
                "connect_timeout_secs": 15
            },
            "retry": {
                "enabled": true,
                "max_attempts": 4,
                "delay_secs": 20
            },
            "logging": {
                "level": "debug",
                "json": true
            }
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load JSON config");

    assert_eq!(config.database.url, "postgres://migrator@db.internal:5432/app");
    assert_eq!(config.database.connect_timeout_secs, 15);
    assert!(config.retry.enabled);
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.retry.delay_secs, 20);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let path = write_config(
        r#"
[database]
url = "host=localhost user=migrator dbname=app"

[retry]
enabled = false
"#,
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load TOML config");

    assert_eq!(config.database.url, "host=localhost user=migrator dbname=app");
    assert!(!config.retry.enabled);
    assert!(!WrapperGate::from_config(&config.retry).is_enabled());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_minimal_fields() {
    let path = write_config(r#"{ "database": { "url": "postgres://localhost/app" } }"#, "json");

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load minimal config");

    assert_eq!(config.database.connect_timeout_secs, 10);
    assert!(config.retry.enabled);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.delay_secs, 10);
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_missing_database_section() {
    let path = write_config("[retry]\nenabled = true\n", "toml");

    let result = config::load_from_file(Some(path.clone()));

    assert!(matches!(result, Err(PgSafeError::Config(ref msg)) if msg.contains("Invalid TOML")));
    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/pgsafe.toml".into()));

    match result {
        Err(PgSafeError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}
