//! Session credentials and request context
//!
//! This module owns everything the API client needs to know about the
//! current session, without performing any HTTP itself.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │  SessionInvalidator │  Clears credentials, redirects to login
//! └─────────┬──────────┘
//!           │
//!           ├──► TokenStore          (accessToken / refreshToken pair)
//!           │         │
//!           │         └──► KeyValueStorage  (memory or file backed)
//!           │
//!           └──► SessionNavigator    (present only with a UI attached)
//!
//! TenantContext ──► KeyValueStorage  (read-only tenant selection)
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: The credential pair (`TokenPair`)
//! - **[`traits`]**: `TokenStore` and `SessionNavigator` seams
//! - **[`token_store`]**: `TokenStore` on top of `KeyValueStorage`
//! - **[`tenant`]**: Best-effort tenant selection reader
//! - **[`session`]**: Session invalidation side effect

pub mod session;
pub mod tenant;
pub mod token_store;
pub mod traits;
pub mod types;

pub use session::SessionInvalidator;
pub use tenant::TenantContext;
pub use token_store::{StorageTokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use traits::{SessionNavigator, TokenStore};
pub use types::TokenPair;
