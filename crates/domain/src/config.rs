//! Configuration management

use serde::{Deserialize, Serialize};

/// Default API root used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";
/// Default per-request timeout applied to every call (original, refresh, retry).
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base endpoint; every relative request path is resolved against it
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Endpoint accepting `{ refreshToken }`, relative to `base_url`
    pub refresh_path: String,
    pub login_path: String,
    pub logout_path: String,
    /// Header carrying the selected tenant identifier
    pub tenant_header: String,
    pub user_agent: Option<String>,
}

/// Durable client-side storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the storage; in-memory when absent
    pub path: Option<String>,
    /// Key of the separately namespaced tenant-selection store
    pub tenant_key: String,
}

/// Session invalidation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Navigation target after the session is invalidated
    pub login_route: String,
    /// Storage key receiving the path to return to after login
    pub redirect_key: String,
}

impl ApiConfig {
    /// Request timeout as a [`std::time::Duration`].
    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            refresh_path: "/auth/refresh".to_string(),
            login_path: "/auth/login".to_string(),
            logout_path: "/auth/logout".to_string(),
            tenant_header: "X-Tenant-ID".to_string(),
            user_agent: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: None, tenant_key: "tenant-storage".to_string() }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { login_route: "/login".to_string(), redirect_key: "redirectAfterLogin".to_string() }
    }
}
