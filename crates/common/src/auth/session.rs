//! Session invalidation
//!
//! Invoked when the session can no longer be recovered: the refresh call was
//! rejected with 401/403, or there is no refresh token to try. Clears the
//! credential pair and, with a UI attached, sends the user to the login page
//! after remembering where they were.

use std::sync::Arc;

use tokio::task;
use tracing::{info, warn};

use super::traits::{SessionNavigator, TokenStore};
use crate::storage::{KeyValueStorage, StorageError, StorageResult};

/// Performs the session invalidation side effect.
///
/// Safe to call any number of times, including concurrently: every step is
/// idempotent and failures are logged rather than returned.
#[derive(Clone)]
pub struct SessionInvalidator {
    tokens: Arc<dyn TokenStore>,
    storage: Arc<dyn KeyValueStorage>,
    navigator: Option<Arc<dyn SessionNavigator>>,
    login_route: String,
    redirect_key: String,
}

impl SessionInvalidator {
    /// Create an invalidator
    ///
    /// # Arguments
    /// * `tokens` - Credential store to clear
    /// * `storage` - Storage receiving the post-login return path
    /// * `navigator` - UI shell, `None` for headless use
    /// * `login_route` - Navigation target (e.g. `/login`)
    /// * `redirect_key` - Storage key for the return path
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        storage: Arc<dyn KeyValueStorage>,
        navigator: Option<Arc<dyn SessionNavigator>>,
        login_route: impl Into<String>,
        redirect_key: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            storage,
            navigator,
            login_route: login_route.into(),
            redirect_key: redirect_key.into(),
        }
    }

    /// Clear the session and, with a UI attached, redirect to login.
    pub async fn invalidate(&self) {
        if let Err(e) = self.tokens.clear_tokens().await {
            warn!(error = %e, "failed to clear session tokens during invalidation");
        }

        let Some(navigator) = &self.navigator else {
            info!("Session invalidated");
            return;
        };

        if let Some(path) = navigator.current_path() {
            // Already on the login page: keep the original return target.
            if path != self.login_route {
                if let Err(e) = self.record_return_path(path).await {
                    warn!(error = %e, "failed to record post-login redirect path");
                }
            }
        }

        info!(login_route = %self.login_route, "Session invalidated, redirecting to login");
        navigator.redirect_to(&self.login_route);
    }

    async fn record_return_path(&self, path: String) -> StorageResult<()> {
        let storage = Arc::clone(&self.storage);
        let key = self.redirect_key.clone();
        task::spawn_blocking(move || storage.set(&key, &path))
            .await
            .map_err(|e| StorageError::Unavailable(format!("storage task failed: {e}")))?
    }
}

impl std::fmt::Debug for SessionInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInvalidator")
            .field("has_navigator", &self.navigator.is_some())
            .field("login_route", &self.login_route)
            .field("redirect_key", &self.redirect_key)
            .finish_non_exhaustive()
    }
}
