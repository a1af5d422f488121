//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the environment when one is present
//! 2. Attempts to load from environment variables
//! 3. If the base URL is not set there, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ERPADMIN_API_BASE_URL`: API base URL (required on this path)
//! - `ERPADMIN_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `ERPADMIN_API_REFRESH_PATH`: Refresh endpoint, relative to the base URL
//! - `ERPADMIN_TENANT_HEADER`: Name of the tenant header
//! - `ERPADMIN_STORAGE_PATH`: JSON file backing the durable storage
//! - `ERPADMIN_LOGIN_ROUTE`: Navigation target after session invalidation
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./erpadmin.json` or `./erpadmin.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use erpadmin_domain::{Config, ErpAdminError, Result};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ErpAdminError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The resulting configuration fails [`validate`]
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `ERPADMIN_API_BASE_URL` must be set; every other value falls back to its
/// default.
///
/// # Errors
/// Returns `ErpAdminError::Config` if the base URL is missing or a value is
/// invalid.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.api.base_url = env_var("ERPADMIN_API_BASE_URL")?;

    if let Some(timeout) = optional_env_var("ERPADMIN_API_TIMEOUT_SECS") {
        config.api.timeout_seconds = timeout
            .parse::<u64>()
            .map_err(|e| ErpAdminError::Config(format!("Invalid request timeout: {e}")))?;
    }
    if let Some(refresh_path) = optional_env_var("ERPADMIN_API_REFRESH_PATH") {
        config.api.refresh_path = refresh_path;
    }
    if let Some(tenant_header) = optional_env_var("ERPADMIN_TENANT_HEADER") {
        config.api.tenant_header = tenant_header;
    }
    if let Some(storage_path) = optional_env_var("ERPADMIN_STORAGE_PATH") {
        config.storage.path = Some(storage_path);
    }
    if let Some(login_route) = optional_env_var("ERPADMIN_LOGIN_ROUTE") {
        config.session.login_route = login_route;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ErpAdminError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ErpAdminError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ErpAdminError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ErpAdminError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Check that a configuration can drive the client
///
/// # Errors
/// Returns `ErpAdminError::Config` if the base URL is not an absolute
/// `http(s)` URL, the timeout is zero, or the tenant header is empty.
pub fn validate(config: &Config) -> Result<()> {
    let base = url::Url::parse(&config.api.base_url).map_err(|e| {
        ErpAdminError::Config(format!("Invalid base URL {:?}: {e}", config.api.base_url))
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ErpAdminError::Config(format!(
            "Unsupported base URL scheme: {}",
            base.scheme()
        )));
    }
    if config.api.timeout_seconds == 0 {
        return Err(ErpAdminError::Config("Request timeout must be positive".to_string()));
    }
    if config.api.tenant_header.trim().is_empty() {
        return Err(ErpAdminError::Config("Tenant header name must not be empty".to_string()));
    }
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ErpAdminError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ErpAdminError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ErpAdminError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ErpAdminError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./erpadmin.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("erpadmin.json"),
        dir.join("erpadmin.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `ErpAdminError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    optional_env_var(key).ok_or_else(|| {
        ErpAdminError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Get optional environment variable, treating blank values as unset
fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 6] = [
        "ERPADMIN_API_BASE_URL",
        "ERPADMIN_API_TIMEOUT_SECS",
        "ERPADMIN_API_REFRESH_PATH",
        "ERPADMIN_TENANT_HEADER",
        "ERPADMIN_STORAGE_PATH",
        "ERPADMIN_LOGIN_ROUTE",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ERPADMIN_API_BASE_URL", "https://erp.example.com/api");
        std::env::set_var("ERPADMIN_API_TIMEOUT_SECS", "10");
        std::env::set_var("ERPADMIN_API_REFRESH_PATH", "/auth/token/refresh");
        std::env::set_var("ERPADMIN_TENANT_HEADER", "X-Company-ID");
        std::env::set_var("ERPADMIN_STORAGE_PATH", "/tmp/erpadmin-session.json");
        std::env::set_var("ERPADMIN_LOGIN_ROUTE", "/auth/login");

        let config = load_from_env().expect("config from env");
        clear_env();

        assert_eq!(config.api.base_url, "https://erp.example.com/api");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.api.refresh_path, "/auth/token/refresh");
        assert_eq!(config.api.tenant_header, "X-Company-ID");
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/erpadmin-session.json"));
        assert_eq!(config.session.login_route, "/auth/login");
        assert_eq!(config.session.redirect_key, "redirectAfterLogin");
    }

    #[test]
    fn test_load_from_env_defaults_optional_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ERPADMIN_API_BASE_URL", "http://localhost:3001/api");
        std::env::set_var("ERPADMIN_API_TIMEOUT_SECS", "   ");

        let config = load_from_env().expect("config from env");
        clear_env();

        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.refresh_path, "/auth/refresh");
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(ErpAdminError::Config(_))));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ERPADMIN_API_BASE_URL", "http://localhost:3001/api");
        std::env::set_var("ERPADMIN_API_TIMEOUT_SECS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(ErpAdminError::Config(_))));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(ErpAdminError::Config(_))));
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{
            "api": {"base_url": "https://erp.example.com/api", "timeout_seconds": 15},
            "session": {"login_route": "/signin"}
        }"#;

        let config = parse_config(json_content, Path::new("test.json")).expect("valid JSON");
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(config.session.login_route, "/signin");
        assert_eq!(config.api.tenant_header, "X-Tenant-ID");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
[api]
base_url = "https://erp.example.com/api"
tenant_header = "X-Company-ID"

[storage]
path = "session.json"
"#;

        let config = parse_config(toml_content, Path::new("test.toml")).expect("valid TOML");
        assert_eq!(config.api.tenant_header, "X-Company-ID");
        assert_eq!(config.storage.path.as_deref(), Some("session.json"));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", Path::new("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_validate() {
        assert!(validate(&Config::default()).is_ok());

        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.api.base_url = "ftp://erp.example.com".to_string();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.api.tenant_header = " ".to_string();
        assert!(validate(&config).is_err());
    }
}
