//! Traits for credential storage and navigation
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (durable storage, the UI shell).

use async_trait::async_trait;

use super::types::TokenPair;
use crate::storage::StorageResult;

/// Trait for credential persistence
///
/// Abstracts where the access/refresh pair lives so the API client can be
/// tested with an in-memory store and run against durable storage.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, if any
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read
    async fn access_token(&self) -> StorageResult<Option<String>>;

    /// Current refresh token, if any
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read
    async fn refresh_token(&self) -> StorageResult<Option<String>>;

    /// Replace both tokens in one atomic step
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written
    async fn set_tokens(&self, tokens: &TokenPair) -> StorageResult<()>;

    /// Remove both tokens
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written
    async fn clear_tokens(&self) -> StorageResult<()>;
}

/// Trait for the navigation shell hosting the client.
///
/// Only present when the client runs behind a UI; headless clients are
/// built without one and never navigate.
pub trait SessionNavigator: Send + Sync {
    /// Path currently displayed, used as the post-login return target
    fn current_path(&self) -> Option<String>;

    /// Perform a hard navigation to `location`
    fn redirect_to(&self, location: &str);
}
