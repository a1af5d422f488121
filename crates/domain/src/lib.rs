//! # ERP Admin Domain
//!
//! Domain types shared by the ERP admin API client.
//!
//! This crate contains:
//! - Configuration structures for the API client, storage and session
//! - Wire types exchanged with the authentication endpoints
//! - Tenant selection as persisted by the admin panel
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other ERP admin crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
