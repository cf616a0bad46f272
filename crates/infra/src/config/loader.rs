//! Configuration loader
//!
//! Loads pgsafe configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file from the working directory when present
//! 2. Attempts to load from environment variables
//! 3. If `PGSAFE_DATABASE_URL` is missing, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON and TOML)
//! 5. Environment variables that are set override values read from a file
//!
//! ## Environment Variables
//! - `PGSAFE_DATABASE_URL`: Connection string (required for env loading)
//! - `PGSAFE_CONNECT_TIMEOUT`: Connect timeout in seconds
//! - `PGSAFE_RETRY_ENABLED`: Whether lock-timeout retry is installed (true/false)
//! - `PGSAFE_RETRY_MAX_ATTEMPTS`: Retry cap per statement
//! - `PGSAFE_RETRY_DELAY_SECS`: Delay between retries in seconds
//! - `PGSAFE_LOG_LEVEL`: Default log filter
//! - `PGSAFE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./pgsafe.toml` or `./pgsafe.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent directory
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pgsafe_domain::{Config, DatabaseConfig, LoggingConfig, PgSafeError, Result, RetryConfig};

const FILE_NAMES: [&str; 4] = ["pgsafe.toml", "pgsafe.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the database URL is
/// not set there, falls back to a probed config file with environment
/// overrides applied on top.
///
/// # Errors
/// Returns `PgSafeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - An environment override has an invalid value
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `PGSAFE_DATABASE_URL` is required; every other variable falls back
/// to its default.
///
/// # Errors
/// Returns `PgSafeError::Config` if the URL is missing or a variable has an
/// invalid value.
pub fn load_from_env() -> Result<Config> {
    let url = env_var("PGSAFE_DATABASE_URL")?;

    let mut config = Config {
        database: DatabaseConfig { url, ..DatabaseConfig::default() },
        retry: RetryConfig::default(),
        logging: LoggingConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Environment variables that are set override the file's values.
///
/// # Errors
/// Returns `PgSafeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PgSafeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PgSafeError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PgSafeError::Config(format!("Failed to read config file: {e}")))?;

    let mut config = parse_config(&contents, &config_path)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Overwrite fields whose environment variable is set.
///
/// # Errors
/// Returns `PgSafeError::Config` when a numeric or boolean variable does not
/// parse.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(url) = env_opt("PGSAFE_DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(secs) = env_parse("PGSAFE_CONNECT_TIMEOUT", "connect timeout")? {
        config.database.connect_timeout_secs = secs;
    }
    config.retry.enabled = env_bool("PGSAFE_RETRY_ENABLED", config.retry.enabled)?;
    if let Some(attempts) = env_parse("PGSAFE_RETRY_MAX_ATTEMPTS", "retry max attempts")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(secs) = env_parse("PGSAFE_RETRY_DELAY_SECS", "retry delay")? {
        config.retry.delay_secs = secs;
    }
    if let Some(level) = env_opt("PGSAFE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("PGSAFE_LOG_JSON", config.logging.json)?;
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `PgSafeError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PgSafeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PgSafeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PgSafeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, then the executable's
/// directory, trying `pgsafe.{toml,json}` before `config.{toml,json}` in each.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join("..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `PgSafeError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| PgSafeError::Config(format!("Missing required environment variable: {key}")))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable.
///
/// # Errors
/// Returns `PgSafeError::Config` naming `what` if the value does not parse.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| PgSafeError::Config(format!("Invalid {what}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if unset or blank.
///
/// # Errors
/// Returns `PgSafeError::Config` for any other value.
fn env_bool(key: &str, default: bool) -> Result<bool> {
    let Some(raw) = env_opt(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PgSafeError::Config(format!("Invalid boolean for {key}: {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 7] = [
        "PGSAFE_DATABASE_URL",
        "PGSAFE_CONNECT_TIMEOUT",
        "PGSAFE_RETRY_ENABLED",
        "PGSAFE_RETRY_MAX_ATTEMPTS",
        "PGSAFE_RETRY_DELAY_SECS",
        "PGSAFE_LOG_LEVEL",
        "PGSAFE_LOG_JSON",
    ];

    fn clear_env() {
        for key in VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (key, value) in [
            ("PGSAFE_TEST_BOOL_1", "1"),
            ("PGSAFE_TEST_BOOL_TRUE", "true"),
            ("PGSAFE_TEST_BOOL_YES", "yes"),
            ("PGSAFE_TEST_BOOL_ON", "on"),
            ("PGSAFE_TEST_BOOL_UPPER", "TRUE"),
        ] {
            std::env::set_var(key, value);
            assert!(env_bool(key, false).unwrap(), "{value} should parse as true");
            std::env::remove_var(key);
        }

        for (key, value) in [
            ("PGSAFE_TEST_BOOL_0", "0"),
            ("PGSAFE_TEST_BOOL_FALSE", "false"),
            ("PGSAFE_TEST_BOOL_NO", "no"),
            ("PGSAFE_TEST_BOOL_OFF", "off"),
        ] {
            std::env::set_var(key, value);
            assert!(!env_bool(key, true).unwrap(), "{value} should parse as false");
            std::env::remove_var(key);
        }

        std::env::remove_var("PGSAFE_TEST_BOOL_MISSING");
        assert!(env_bool("PGSAFE_TEST_BOOL_MISSING", true).unwrap());
        assert!(!env_bool("PGSAFE_TEST_BOOL_MISSING", false).unwrap());

        std::env::set_var("PGSAFE_TEST_BOOL_BLANK", "  ");
        assert!(env_bool("PGSAFE_TEST_BOOL_BLANK", true).unwrap());
        std::env::remove_var("PGSAFE_TEST_BOOL_BLANK");
    }

    #[test]
    fn test_env_bool_rejects_unknown_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("PGSAFE_TEST_BOOL_TYPO", "ture");
        let result = env_bool("PGSAFE_TEST_BOOL_TYPO", true);
        std::env::remove_var("PGSAFE_TEST_BOOL_TYPO");

        let err = result.unwrap_err();
        assert!(matches!(err, PgSafeError::Config(ref msg) if msg.contains("PGSAFE_TEST_BOOL_TYPO")));
    }

    #[test]
    fn test_misspelled_retry_flag_is_an_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PGSAFE_DATABASE_URL", "host=localhost user=app");
        std::env::set_var("PGSAFE_RETRY_ENABLED", "ture");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(PgSafeError::Config(ref msg)) if msg.contains("PGSAFE_RETRY_ENABLED")));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PGSAFE_DATABASE_URL", "postgres://app@localhost/app");
        std::env::set_var("PGSAFE_CONNECT_TIMEOUT", "3");
        std::env::set_var("PGSAFE_RETRY_ENABLED", "off");
        std::env::set_var("PGSAFE_RETRY_MAX_ATTEMPTS", "5");
        std::env::set_var("PGSAFE_RETRY_DELAY_SECS", "2");
        std::env::set_var("PGSAFE_LOG_LEVEL", "debug");
        std::env::set_var("PGSAFE_LOG_JSON", "yes");

        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.database.url, "postgres://app@localhost/app");
        assert_eq!(config.database.connect_timeout_secs, 3);
        assert!(!config.retry.enabled);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_secs, 2);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PGSAFE_DATABASE_URL", "host=localhost user=app");
        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        assert!(config.retry.enabled);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_secs, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_env_missing_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, PgSafeError::Config(ref msg) if msg.contains("PGSAFE_DATABASE_URL")));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PGSAFE_DATABASE_URL", "postgres://localhost/app");
        std::env::set_var("PGSAFE_RETRY_MAX_ATTEMPTS", "three");
        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, PgSafeError::Config(ref msg) if msg.contains("retry max attempts")));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let path = temp_config(
            r#"
[database]
url = "postgres://file@localhost/app"

[retry]
enabled = true
delay_secs = 7
"#,
            "toml",
        );

        std::env::set_var("PGSAFE_RETRY_ENABLED", "false");
        let result = load_from_file(Some(path.clone()));
        clear_env();
        std::fs::remove_file(path).ok();

        let config = result.unwrap();
        assert_eq!(config.database.url, "postgres://file@localhost/app");
        assert!(!config.retry.enabled);
        assert_eq!(config.retry.delay_secs, 7);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/pgsafe.toml")));

        assert!(matches!(result, Err(PgSafeError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        let path = temp_config(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(PgSafeError::Config(ref msg)) if msg.starts_with("Invalid JSON")));
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{
            "database": { "url": "postgres://localhost/app", "connect_timeout_secs": 4 },
            "logging": { "level": "warn", "json": true }
        }"#;

        let config = parse_config(json_content, Path::new("pgsafe.json")).unwrap();
        assert_eq!(config.database.connect_timeout_secs, 4);
        assert!(config.logging.json);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
[database]
url = "postgres://localhost/app"

[retry]
max_attempts = 1
"#;

        let config = parse_config(toml_content, Path::new("pgsafe.toml")).unwrap();
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.delay_secs, 10);
        assert_eq!(config.database.connect_timeout_secs, 10);
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", Path::new("pgsafe.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
