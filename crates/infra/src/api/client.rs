//! Authenticated API client
//!
//! Every call is decorated with the current bearer token and tenant header,
//! dispatched once, and on a first 401 goes through exactly one
//! refresh-and-retry cycle shared with every other call that hit a 401 in
//! the same window.

use std::sync::Arc;

use erpadmin_common::auth::{
    SessionInvalidator, SessionNavigator, StorageTokenStore, TenantContext, TokenPair, TokenStore,
};
use erpadmin_common::storage::{FileStorage, KeyValueStorage, MemoryStorage};
use erpadmin_domain::Config;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::errors::ApiError;
use super::refresh::RefreshCoordinator;
use super::request::{ApiRequest, RequestBody, TrackedRequest};
use crate::http::HttpClient;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Authenticated API client.
///
/// Cheap to clone; clones share the token store and the refresh slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: String,
    tenant_header: String,
    tokens: Arc<dyn TokenStore>,
    tenant: TenantContext,
    refresher: RefreshCoordinator,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Base URL every relative path is resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    pub(crate) fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    pub(crate) fn url_for(&self, path: &str) -> String {
        self.resolve_url(path)
    }

    /// Execute a GET request
    ///
    /// # Errors
    /// Returns error if the request fails after the refresh-and-retry cycle
    /// or the response cannot be deserialized
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.execute(ApiRequest::get(path)).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    /// Returns error if the request fails after the refresh-and-retry cycle
    /// or the response cannot be deserialized
    pub async fn post<T, R>(&self, path: &str, body: &T) -> Result<R, ApiError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    /// Returns error if the request fails after the refresh-and-retry cycle
    /// or the response cannot be deserialized
    pub async fn put<T, R>(&self, path: &str, body: &T) -> Result<R, ApiError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(ApiRequest::put(path).json(body)?).await
    }

    /// Execute a PATCH request with a JSON body
    ///
    /// # Errors
    /// Returns error if the request fails after the refresh-and-retry cycle
    /// or the response cannot be deserialized
    pub async fn patch<T, R>(&self, path: &str, body: &T) -> Result<R, ApiError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(ApiRequest::patch(path).json(body)?).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    /// Returns error if the request fails after the refresh-and-retry cycle
    /// or the response cannot be deserialized
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Execute any request and decode its JSON response.
    ///
    /// 204 and 205 responses decode from JSON `null`, so `()` and `Option<_>`
    /// work as response types.
    ///
    /// # Errors
    /// Returns error if the request fails after the refresh-and-retry cycle
    /// or the response cannot be deserialized
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let response = self.dispatch_with_refresh(TrackedRequest::new(request)).await?;
        decode(response).await
    }

    /// Execute a request and hand back the successful raw response.
    ///
    /// # Errors
    /// Returns error if the request fails after the refresh-and-retry cycle
    pub async fn execute_raw(&self, request: ApiRequest) -> Result<Response, ApiError> {
        self.dispatch_with_refresh(TrackedRequest::new(request)).await
    }

    /// Store a new credential pair
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the pair cannot be persisted
    pub async fn set_auth_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<(), ApiError> {
        let pair = TokenPair::new(access_token, refresh_token);
        self.inner.tokens.set_tokens(&pair).await?;
        Ok(())
    }

    /// Remove both stored tokens
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the tokens cannot be removed
    pub async fn clear_auth_tokens(&self) -> Result<(), ApiError> {
        self.inner.tokens.clear_tokens().await?;
        Ok(())
    }

    /// Whether an access token is currently stored.
    ///
    /// Unreadable storage counts as unauthenticated.
    pub async fn is_authenticated(&self) -> bool {
        match self.inner.tokens.access_token().await {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "failed to read access token");
                false
            }
        }
    }

    /// Run the request state machine: dispatch, and on a first 401 refresh
    /// once and dispatch again.
    async fn dispatch_with_refresh(&self, mut tracked: TrackedRequest) -> Result<Response, ApiError> {
        loop {
            match self.dispatch(&tracked.request).await {
                Err(err) if err.is_unauthorized() && tracked.may_retry() => {
                    tracked.mark_retried();
                    debug!("Received 401, refreshing access token before retrying");
                    self.inner.refresher.refresh().await?;
                }
                outcome => return outcome,
            }
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let builder = self.decorate(request).await?;
        let response = self.inner.http.send(builder).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::http(status.as_u16(), &body))
    }

    async fn decorate(&self, request: &ApiRequest) -> Result<RequestBuilder, ApiError> {
        let url = self.resolve_url(&request.path);
        let mut builder = self.inner.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let transport_typed = request.body.is_transport_typed();
        for (name, value) in &request.headers {
            if transport_typed && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        match self.inner.tokens.access_token().await {
            Ok(Some(token)) => builder = builder.header(AUTHORIZATION, format!("Bearer {token}")),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read access token, sending without it"),
        }

        if let Some(tenant_id) = self.inner.tenant.tenant_id() {
            builder = builder.header(self.inner.tenant_header.as_str(), tenant_id.to_string());
        }

        builder = match &request.body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE),
            RequestBody::Json(value) => {
                let payload = serde_json::to_vec(value)
                    .map_err(|e| ApiError::Config(format!("failed to serialize body: {e}")))?;
                builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(payload)
            }
            RequestBody::Multipart(payload) => builder.multipart(payload.to_form()?),
            RequestBody::Binary { bytes, content_type } => {
                let builder = builder.body(bytes.clone());
                match content_type {
                    Some(mime) => builder.header(CONTENT_TYPE, mime.as_str()),
                    None => builder,
                }
            }
        };

        Ok(builder)
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        join_url(&self.inner.base_url, path)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("tenant_header", &self.inner.tenant_header)
            .field("refresher", &self.inner.refresher)
            .finish_non_exhaustive()
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    let status = response.status();

    // 204/205 carry no body
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
            ApiError::Decode(format!(
                "No content response ({}), but response type cannot be deserialized from empty body",
                status.as_u16()
            ))
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")))
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<Config>,
    base_url: Option<String>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    navigator: Option<Arc<dyn SessionNavigator>>,
    http: Option<HttpClient>,
}

impl ApiClientBuilder {
    /// Set the client configuration
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Override `api.base_url` of the configuration, whichever order
    /// `config` and `base_url` are called in
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Durable storage for tokens and tenant selection.
    ///
    /// Defaults to a [`FileStorage`] at `storage.path`, or a
    /// [`MemoryStorage`] when no path is configured.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Attach a UI navigator used when the session is invalidated
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn SessionNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Use a preconfigured transport instead of one built from the config
    #[must_use]
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    /// Returns error if the storage cannot be opened or the transport cannot
    /// be created
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(base_url) = self.base_url {
            config.api.base_url = base_url;
        }

        let storage: Arc<dyn KeyValueStorage> = match (self.storage, &config.storage.path) {
            (Some(storage), _) => storage,
            (None, Some(path)) => Arc::new(FileStorage::open(path)?),
            (None, None) => Arc::new(MemoryStorage::new()),
        };

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = HttpClient::builder().timeout(config.api.timeout());
                if let Some(agent) = &config.api.user_agent {
                    builder = builder.user_agent(agent.clone());
                }
                builder.build()?
            }
        };

        let tokens: Arc<dyn TokenStore> = Arc::new(StorageTokenStore::new(Arc::clone(&storage)));
        let tenant = TenantContext::new(Arc::clone(&storage), config.storage.tenant_key.clone());
        let invalidator = SessionInvalidator::new(
            Arc::clone(&tokens),
            storage,
            self.navigator,
            config.session.login_route.clone(),
            config.session.redirect_key.clone(),
        );
        let refresher = RefreshCoordinator::new(
            http.clone(),
            join_url(&config.api.base_url, &config.api.refresh_path),
            Arc::clone(&tokens),
            invalidator,
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api.base_url,
                tenant_header: config.api.tenant_header,
                tokens,
                tenant,
                refresher,
            }),
        })
    }
}
