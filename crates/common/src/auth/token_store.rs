//! Credential persistence layered on top of `KeyValueStorage`.
//!
//! The pair is stored as two plain entries so other readers of the same
//! storage (the admin panel) see the usual `accessToken` / `refreshToken`
//! keys. Both entries are always written and removed together.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;
use tracing::debug;

use super::traits::TokenStore;
use super::types::TokenPair;
use crate::storage::{KeyValueStorage, StorageError, StorageResult};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// [`TokenStore`] backed by any [`KeyValueStorage`].
#[derive(Clone)]
pub struct StorageTokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl StorageTokenStore {
    /// Create a token store over `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Run a storage operation on the blocking pool; file backends do
    /// synchronous I/O.
    async fn with_storage<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KeyValueStorage) -> StorageResult<T> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        task::spawn_blocking(move || op(storage.as_ref()))
            .await
            .map_err(|e| StorageError::Unavailable(format!("storage task failed: {e}")))?
    }
}

impl std::fmt::Debug for StorageTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageTokenStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenStore for StorageTokenStore {
    async fn access_token(&self) -> StorageResult<Option<String>> {
        self.with_storage(|storage| storage.get(ACCESS_TOKEN_KEY)).await
    }

    async fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.with_storage(|storage| storage.get(REFRESH_TOKEN_KEY)).await
    }

    async fn set_tokens(&self, tokens: &TokenPair) -> StorageResult<()> {
        debug!("Storing session tokens");
        let tokens = tokens.clone();
        self.with_storage(move |storage| {
            storage.set_many(&[
                (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
                (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
            ])
        })
        .await
    }

    async fn clear_tokens(&self) -> StorageResult<()> {
        debug!("Clearing session tokens");
        self.with_storage(|storage| storage.remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY]))
            .await
    }
}
