//! Test doubles for the storage and auth seams
//!
//! ```rust
//! use erpadmin_common::auth::SessionNavigator;
//! use erpadmin_common::testing::RecordingNavigator;
//!
//! let navigator = RecordingNavigator::at("/orders");
//! navigator.redirect_to("/login");
//! assert_eq!(navigator.redirects(), vec!["/login".to_string()]);
//! ```

pub mod mocks;

pub use mocks::{FailingStorage, RecordingNavigator};
