//! Single-flight token refresh
//!
//! Any number of callers can ask for a refresh at the same time; only the
//! first one starts the refresh call and everybody awaits the same shared
//! outcome. The refresh runs on a spawned task and empties the shared slot
//! when it settles, so the next 401 after that starts a fresh attempt.

use std::sync::Arc;

use erpadmin_common::auth::{SessionInvalidator, TokenPair, TokenStore};
use erpadmin_domain::{RefreshRequest, RefreshResponse};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use reqwest::Method;
use tracing::{debug, info, warn};

use super::errors::ApiError;
use crate::http::HttpClient;

type RefreshFuture = Shared<BoxFuture<'static, Result<TokenPair, ApiError>>>;

/// Coordinates access-token refreshes for one API client.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<RefreshInner>,
}

struct RefreshInner {
    http: HttpClient,
    refresh_url: String,
    tokens: Arc<dyn TokenStore>,
    invalidator: SessionInvalidator,
    pending: Mutex<Option<RefreshFuture>>,
}

impl RefreshCoordinator {
    /// Create a coordinator posting to `refresh_url` through the bare `http`
    /// client.
    #[must_use]
    pub fn new(
        http: HttpClient,
        refresh_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        invalidator: SessionInvalidator,
    ) -> Self {
        Self {
            inner: Arc::new(RefreshInner {
                http,
                refresh_url: refresh_url.into(),
                tokens,
                invalidator,
                pending: Mutex::new(None),
            }),
        }
    }

    /// Whether a refresh is currently executing
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    /// Refresh the session, joining the refresh already in flight if any.
    ///
    /// # Errors
    /// Returns the refresh failure. When it ends the session (401/403 or no
    /// refresh token) the session has been invalidated before this returns.
    pub async fn refresh(&self) -> Result<TokenPair, ApiError> {
        let shared = {
            let mut pending = self.inner.pending.lock();
            if let Some(existing) = pending.as_ref() {
                debug!("Joining in-flight token refresh");
                existing.clone()
            } else {
                // Spawned: must settle and free the slot even when every
                // caller is dropped.
                let inner = Arc::clone(&self.inner);
                let handle = tokio::spawn(async move {
                    let outcome = inner.run().await;
                    inner.pending.lock().take();
                    outcome
                });
                let refresh = handle
                    .map(|joined| {
                        joined.unwrap_or_else(|e| {
                            Err(ApiError::Internal(format!("token refresh task failed: {e}")))
                        })
                    })
                    .boxed()
                    .shared();
                *pending = Some(refresh.clone());
                refresh
            }
        };

        shared.await
    }
}

impl RefreshInner {
    async fn run(&self) -> Result<TokenPair, ApiError> {
        match self.perform_refresh().await {
            Ok(tokens) => {
                info!("Access token refreshed");
                Ok(tokens)
            }
            Err(err) if err.invalidates_session() => {
                warn!(error = %err, kind = err.label(), "Token refresh rejected, ending session");
                self.invalidator.invalidate().await;
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, kind = err.label(), "Token refresh failed, keeping session");
                Err(err)
            }
        }
    }

    async fn perform_refresh(&self) -> Result<TokenPair, ApiError> {
        let refresh_token =
            self.tokens.refresh_token().await?.ok_or(ApiError::NoRefreshToken)?;

        let body = RefreshRequest { refresh_token: refresh_token.clone() };
        let request = self.http.request(Method::POST, &self.refresh_url).json(&body);
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::http(status.as_u16(), &text));
        }

        let text = response.text().await?;
        let parsed: RefreshResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::MalformedRefreshResponse(format!("invalid JSON: {e}")))?;

        let access_token = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::MalformedRefreshResponse("missing accessToken".into()))?;
        let refresh_token =
            parsed.refresh_token.filter(|token| !token.is_empty()).unwrap_or(refresh_token);

        let pair = TokenPair::new(access_token, refresh_token);
        self.tokens.set_tokens(&pair).await?;
        debug!(expires_in = ?parsed.expires_in, "Stored refreshed session tokens");
        Ok(pair)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_url", &self.inner.refresh_url)
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use erpadmin_common::auth::StorageTokenStore;
    use erpadmin_common::storage::MemoryStorage;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn coordinator(server: &MockServer) -> (RefreshCoordinator, Arc<StorageTokenStore>) {
        let storage = Arc::new(MemoryStorage::new());
        let tokens = Arc::new(StorageTokenStore::new(storage.clone()));
        tokens.set_tokens(&TokenPair::new("A1", "R1")).await.unwrap();

        let invalidator =
            SessionInvalidator::new(tokens.clone(), storage, None, "/login", "redirectAfterLogin");
        let coordinator = RefreshCoordinator::new(
            HttpClient::new().unwrap(),
            format!("{}/auth/refresh", server.uri()),
            tokens.clone(),
            invalidator,
        );
        (coordinator, tokens)
    }

    #[tokio::test]
    async fn stores_refreshed_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({"refreshToken": "R1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2", "expiresIn": 900})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (coordinator, tokens) = coordinator(&server).await;
        let pair = coordinator.refresh().await.unwrap();

        assert_eq!(pair, TokenPair::new("A2", "R2"));
        assert_eq!(tokens.access_token().await.unwrap().as_deref(), Some("A2"));
        assert_eq!(tokens.refresh_token().await.unwrap().as_deref(), Some("R2"));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2"}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (coordinator, tokens) = coordinator(&server).await;
        let (a, b, c) =
            tokio::join!(coordinator.refresh(), coordinator.refresh(), coordinator.refresh());

        for result in [a, b, c] {
            assert_eq!(result.unwrap(), TokenPair::new("A2", "R1"));
        }
        assert_eq!(tokens.refresh_token().await.unwrap().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn slot_is_released_after_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A3"})))
            .mount(&server)
            .await;

        let (coordinator, tokens) = coordinator(&server).await;

        let first = coordinator.refresh().await;
        assert!(matches!(first, Err(ApiError::Http { status: 500, .. })));
        assert_eq!(tokens.access_token().await.unwrap().as_deref(), Some("A1"));
        assert!(!coordinator.is_refreshing());

        let second = coordinator.refresh().await.unwrap();
        assert_eq!(second.access_token, "A3");
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let (coordinator, tokens) = coordinator(&server).await;
        tokens.clear_tokens().await.unwrap();

        let result = coordinator.refresh().await;
        assert!(matches!(result, Err(ApiError::NoRefreshToken)));
    }

    #[tokio::test]
    async fn rejected_refresh_clears_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
            .mount(&server)
            .await;

        let (coordinator, tokens) = coordinator(&server).await;
        let result = coordinator.refresh().await;

        assert!(matches!(result, Err(ApiError::Http { status: 401, .. })));
        assert_eq!(tokens.access_token().await.unwrap(), None);
        assert_eq!(tokens.refresh_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_response_keeps_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"expiresIn": 900})))
            .mount(&server)
            .await;

        let (coordinator, tokens) = coordinator(&server).await;
        let result = coordinator.refresh().await;

        assert!(matches!(result, Err(ApiError::MalformedRefreshResponse(_))));
        assert_eq!(tokens.access_token().await.unwrap().as_deref(), Some("A1"));
        assert_eq!(tokens.refresh_token().await.unwrap().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn non_json_success_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let (coordinator, tokens) = coordinator(&server).await;
        let result = coordinator.refresh().await;

        assert!(matches!(result, Err(ApiError::MalformedRefreshResponse(_))));
        assert_eq!(tokens.refresh_token().await.unwrap().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn refresh_completes_when_initiator_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (coordinator, tokens) = coordinator(&server).await;
        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), coordinator.refresh()).await;
        assert!(timed_out.is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(!coordinator.is_refreshing());
        assert_eq!(tokens.access_token().await.unwrap().as_deref(), Some("A2"));
        assert_eq!(tokens.refresh_token().await.unwrap().as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn joiner_gets_outcome_after_initiator_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "A2"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (coordinator, _tokens) = coordinator(&server).await;
        let initiator = coordinator.clone();
        let dropped = tokio::spawn(async move { initiator.refresh().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(coordinator.is_refreshing());

        let joiner = coordinator.refresh();
        dropped.abort();

        assert_eq!(joiner.await.unwrap(), TokenPair::new("A2", "R1"));
        assert!(!coordinator.is_refreshing());
    }
}
