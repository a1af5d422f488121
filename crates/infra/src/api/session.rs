//! Login and logout
//!
//! Both calls go through the bare transport: login has no session yet, and
//! a failing logout must never start a refresh.

use erpadmin_common::auth::TokenPair;
use erpadmin_domain::{ApiConfig, LoginCredentials, LoginResponse};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use tracing::{info, instrument, warn};

use super::client::ApiClient;
use super::errors::ApiError;

/// Session lifecycle around an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct SessionService {
    client: ApiClient,
    login_path: String,
    logout_path: String,
}

impl SessionService {
    /// Create a session service using the login/logout paths of `api`
    #[must_use]
    pub fn new(client: ApiClient, api: &ApiConfig) -> Self {
        Self { client, login_path: api.login_path.clone(), logout_path: api.logout_path.clone() }
    }

    /// Log in and store the returned credential pair.
    ///
    /// # Errors
    /// Returns `ApiError::Http` when the credentials are rejected,
    /// `ApiError::Decode` for an unexpected body, or a network/storage error.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        let http = self.client.http();
        let url = self.client.url_for(&self.login_path);
        let response = http.send(http.request(Method::POST, url).json(credentials)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        let login: LoginResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("invalid login response: {e}")))?;

        self.client
            .tokens()
            .set_tokens(&TokenPair::new(login.access_token.clone(), login.refresh_token.clone()))
            .await?;

        info!("Logged in");
        Ok(login)
    }

    /// Notify the backend and clear the local session.
    ///
    /// The backend call is best-effort; local tokens are cleared whatever it
    /// returns.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` only if the local tokens cannot be cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let tokens = self.client.tokens();

        match tokens.access_token().await {
            Ok(Some(access_token)) => {
                let http = self.client.http();
                let request = http
                    .request(Method::POST, self.client.url_for(&self.logout_path))
                    .header(AUTHORIZATION, format!("Bearer {access_token}"));
                match http.send(request).await {
                    Ok(response) if !response.status().is_success() => {
                        warn!(status = %response.status(), "logout endpoint rejected the request");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "logout endpoint unreachable"),
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read access token for logout"),
        }

        tokens.clear_tokens().await?;
        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use erpadmin_common::storage::{KeyValueStorage, MemoryStorage};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn service(server: &MockServer) -> (SessionService, ApiClient, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let client =
            ApiClient::builder().base_url(server.uri()).storage(storage.clone()).build().unwrap();
        let service = SessionService::new(client.clone(), &ApiConfig::default());
        (service, client, storage)
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials { username: "admin".to_string(), password: "secret".to_string() }
    }

    #[tokio::test]
    async fn login_stores_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"username": "admin", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "A1",
                "refreshToken": "R1",
                "expiresIn": 900,
                "user": {"id": 1, "username": "admin"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (service, client, storage) = service(&server);
        let login = service.login(&credentials()).await.unwrap();

        assert_eq!(login.user.unwrap()["username"], "admin");
        assert!(client.is_authenticated().await);
        assert_eq!(storage.get("refreshToken").unwrap().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn rejected_login_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST")).and(path("/auth/refresh")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let (service, client, _) = service(&server);
        let err = service.login(&credentials()).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn logout_clears_tokens_even_when_backend_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(header("Authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (service, client, _) = service(&server);
        client.set_auth_tokens("A1", "R1").await.unwrap();

        service.logout().await.unwrap();
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn logout_without_session_skips_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let (service, _, _) = service(&server);
        service.logout().await.unwrap();
    }
}
