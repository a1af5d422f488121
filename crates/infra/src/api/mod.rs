//! Authenticated API client for the ERP backend
//!
//! # Architecture
//!
//! - [`ApiClient`] decorates each call (bearer token, tenant header, content
//!   type) and drives the per-request state machine
//! - [`RefreshCoordinator`] runs at most one refresh call at a time and
//!   shares its outcome with every waiting request
//! - [`SessionService`] logs in and out through the bare transport
//! - Errors are [`ApiError`] values tagged with an [`ApiErrorKind`]

pub mod client;
pub mod errors;
pub mod refresh;
pub mod request;
pub mod session;

pub use client::{ApiClient, ApiClientBuilder};
pub use errors::{ApiError, ApiErrorKind};
pub use refresh::RefreshCoordinator;
pub use request::{ApiRequest, MultipartPart, MultipartPayload, RequestBody, TrackedRequest};
pub use session::SessionService;
