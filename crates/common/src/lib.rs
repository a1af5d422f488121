//! Runtime building blocks shared by the ERP admin API client.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: durable key/value storage
//! - `runtime`: credential store, tenant reader, session invalidation and
//!   tracing initialisation
//! - `test-utils`: test doubles for the storage and navigation seams

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod storage;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod auth;
#[cfg(feature = "runtime")]
pub mod observability;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(all(feature = "runtime", any(feature = "test-utils", test)))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use auth::{
    SessionInvalidator, SessionNavigator, StorageTokenStore, TenantContext, TokenPair, TokenStore,
};
#[cfg(feature = "runtime")]
pub use observability::{init_tracing, LogFormat};
#[cfg(feature = "foundation")]
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError, StorageResult};
