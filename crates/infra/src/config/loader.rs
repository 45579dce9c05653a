//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the environment when one is present
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `BOOKLINE_API_URL`: Backend API base URL
//! - `BOOKLINE_GOOGLE_CLIENT_ID`: Google OAuth client id
//! - `BOOKLINE_APP_ORIGIN`: Origin the application is served from
//! - `BOOKLINE_API_TIMEOUT_SECS`: Request timeout in seconds (optional)
//! - `BOOKLINE_SILENT_TIMEOUT_SECS`: Silent prompt fallback timeout (optional)
//! - `BOOKLINE_POPUP_TIMEOUT_SECS`: Popup flow timeout (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./bookline.toml` or `./bookline.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location
//!
//! Every field in a file is optional; missing fields keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bookline_domain::{AppConfig, BooklineError, Result};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["bookline.toml", "bookline.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `BooklineError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
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

/// Load configuration, falling back to defaults when no source is found
pub fn load_or_default() -> AppConfig {
    load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "No usable configuration found, using defaults");
        AppConfig::default()
    })
}

/// Load configuration from environment variables
///
/// The three required variables must be present; the timeouts are optional.
///
/// # Errors
/// Returns `BooklineError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();

    config.api.base_url = env_var("BOOKLINE_API_URL")?;
    config.oauth.client_id = Some(env_var("BOOKLINE_GOOGLE_CLIENT_ID")?);
    config.app_origin = env_var("BOOKLINE_APP_ORIGIN")?;

    if let Some(secs) = env_secs("BOOKLINE_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = secs;
    }
    if let Some(secs) = env_secs("BOOKLINE_SILENT_TIMEOUT_SECS")? {
        config.login.silent_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = env_secs("BOOKLINE_POPUP_TIMEOUT_SECS")? {
        config.login.popup_timeout = Duration::from_secs(secs);
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `BooklineError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BooklineError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BooklineError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        let infra: InfraError = e.into();
        BooklineError::Config(format!("Failed to read config file: {}", BooklineError::from(infra)))
    })?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `BooklineError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BooklineError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BooklineError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(BooklineError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory and up to two parents, then the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `BooklineError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            BooklineError::Config(format!("Missing required environment variable: {}", key))
        })
}

/// Parse an optional whole number of seconds
fn env_secs(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| BooklineError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "BOOKLINE_API_URL",
        "BOOKLINE_GOOGLE_CLIENT_ID",
        "BOOKLINE_APP_ORIGIN",
        "BOOKLINE_API_TIMEOUT_SECS",
        "BOOKLINE_SILENT_TIMEOUT_SECS",
        "BOOKLINE_POPUP_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKLINE_API_URL", "https://api.book.example");
        std::env::set_var("BOOKLINE_GOOGLE_CLIENT_ID", "client-123");
        std::env::set_var("BOOKLINE_APP_ORIGIN", "https://book.example");
        std::env::set_var("BOOKLINE_POPUP_TIMEOUT_SECS", "60");

        let result = load_from_env();
        assert!(result.is_ok(), "Should load config from env vars, error: {:?}", result.err());

        let config = result.unwrap();
        assert_eq!(config.api.base_url, "https://api.book.example");
        assert_eq!(config.oauth.client_id.as_deref(), Some("client-123"));
        assert_eq!(config.app_origin, "https://book.example");
        assert_eq!(config.login.popup_timeout, Duration::from_secs(60));
        assert_eq!(config.login.silent_timeout, Duration::from_secs(10));

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKLINE_API_URL", "https://api.book.example");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, BooklineError::Config(msg) if msg.contains("BOOKLINE_GOOGLE_CLIENT_ID")));

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKLINE_API_URL", "https://api.book.example");
        std::env::set_var("BOOKLINE_GOOGLE_CLIENT_ID", "client-123");
        std::env::set_var("BOOKLINE_APP_ORIGIN", "https://book.example");
        std::env::set_var("BOOKLINE_API_TIMEOUT_SECS", "soon");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, BooklineError::Config(_)), "Should be a Config error");

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml_keeps_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
app_origin = "https://book.example"

[api]
base_url = "https://api.book.example"

[oauth]
client_id = "client-123"

[login]
popup_timeout = 90000
"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.app_origin, "https://book.example");
        assert_eq!(config.oauth.client_id.as_deref(), Some("client-123"));
        assert_eq!(config.login.popup_timeout, Duration::from_secs(90));
        assert_eq!(config.login.popup_width, 500);
        assert_eq!(config.loader.max_attempts, 3);
    }

    #[test]
    fn test_load_from_file_json() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"api": {{"timeout_secs": 5}}}}"#).unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn test_load_from_file_errors() {
        let missing = load_from_file(Some(PathBuf::from("/nonexistent/bookline.toml")));
        assert!(matches!(missing, Err(BooklineError::Config(_))));

        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "api: {{}}").unwrap();
        let unsupported = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(unsupported.to_string().contains("Unsupported config format"));
    }
}
