//! # ERP Admin Infrastructure
//!
//! Impure adapters of the ERP admin API client.
//!
//! This crate contains:
//! - The single-attempt HTTP transport
//! - The authenticated API client with single-flight token refresh
//! - Login/logout session handling
//! - The configuration loader (environment, `.env`, JSON/TOML files)
//!
//! ## Architecture
//! - Storage, credentials and session invalidation come from
//!   `erpadmin-common`
//! - Configuration and wire types come from `erpadmin-domain`
//! - Contains all network I/O

pub mod api;
pub mod config;
pub mod http;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientBuilder, ApiError, ApiErrorKind, ApiRequest, MultipartPayload,
    RefreshCoordinator, RequestBody, SessionService,
};
pub use http::{HttpClient, HttpClientBuilder};
