//! API-specific error types
//!
//! Every failure surfaced by the API client carries an explicit kind and,
//! for HTTP failures, the status and decoded body so callers can keep
//! extracting server-provided messages.

use erpadmin_common::storage::StorageError;
use erpadmin_domain::ErpAdminError;
use serde_json::Value;
use thiserror::Error;

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No response was received (timeout, DNS, connection reset)
    Network,
    /// A response with a non-2xx status was received
    Http,
    /// Failure raised by the client itself
    Local,
}

/// API operation errors
///
/// `Clone` so a single refresh outcome can be handed to every caller that
/// waited on it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {message}")]
    Network { message: String, timed_out: bool },

    #[error("HTTP {status}{}", format_body(.body.as_ref()))]
    Http { status: u16, body: Option<Value> },

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Malformed refresh response: {0}")]
    MalformedRefreshResponse(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_body(body: Option<&Value>) -> String {
    match body {
        None => String::new(),
        Some(Value::String(text)) => format!(": {text}"),
        Some(other) => format!(": {other}"),
    }
}

impl ApiError {
    /// Build an HTTP error from a status and raw response text.
    ///
    /// JSON bodies are kept structured; anything else is kept as a string.
    #[must_use]
    pub fn http(status: u16, body: &str) -> Self {
        let body = if body.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
        };
        Self::Http { status, body }
    }

    /// Get the error kind
    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Network { .. } => ApiErrorKind::Network,
            Self::Http { .. } => ApiErrorKind::Http,
            Self::NoRefreshToken
            | Self::MalformedRefreshResponse(_)
            | Self::Decode(_)
            | Self::Storage(_)
            | Self::Config(_)
            | Self::Internal(_) => ApiErrorKind::Local,
        }
    }

    /// HTTP status, present only for [`ApiErrorKind::Http`]
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check for a 401 response
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// Check for a 401 or 403 response
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Whether a failed refresh with this error ends the session.
    ///
    /// True for 401/403 and for a missing refresh token. Network failures,
    /// other statuses and malformed responses keep the stored tokens.
    #[must_use]
    pub const fn invalidates_session(&self) -> bool {
        self.is_auth_failure() || matches!(self, Self::NoRefreshToken)
    }

    /// Check for a transport timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timed_out: true, .. })
    }

    /// Server-provided message of an HTTP error, from a `message` or `error`
    /// field of a JSON body or from a plain-text body.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        let Self::Http { body: Some(body), .. } = self else {
            return None;
        };

        match body {
            Value::String(text) => Some(text.as_str()),
            Value::Object(map) => ["message", "error"]
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str)),
            _ => None,
        }
    }

    /// Stable short label for logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Network { timed_out: true, .. } => "timeout",
            Self::Network { .. } => "network",
            Self::Http { .. } => "http",
            Self::NoRefreshToken => "no_refresh_token",
            Self::MalformedRefreshResponse(_) => "malformed_refresh_response",
            Self::Decode(_) => "decode",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Config(err.to_string());
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Network { message: err.to_string(), timed_out: err.is_timeout() }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<ErpAdminError> for ApiError {
    fn from(err: ErpAdminError) -> Self {
        match err {
            ErpAdminError::Storage(message) => Self::Storage(message),
            ErpAdminError::Network(message) => Self::Network { message, timed_out: false },
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<ApiError> for ErpAdminError {
    fn from(err: ApiError) -> Self {
        match err.kind() {
            ApiErrorKind::Network => Self::Network(err.to_string()),
            ApiErrorKind::Http if err.is_auth_failure() => Self::Auth(err.to_string()),
            _ if err.invalidates_session() => Self::Auth(err.to_string()),
            ApiErrorKind::Http => Self::Network(err.to_string()),
            ApiErrorKind::Local => match err {
                ApiError::Storage(message) => Self::Storage(message),
                ApiError::Config(message) => Self::Config(message),
                other => Self::Internal(other.to_string()),
            },
        }
    }
}
