#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use erpadmin_common::storage::{KeyValueStorage, MemoryStorage};
use erpadmin_common::testing::RecordingNavigator;
use erpadmin_infra::{ApiClient, HttpClient};
use wiremock::{MockServer, Request};

pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// Install a test-friendly subscriber once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("erpadmin_infra=debug"))
            .with_test_writer()
            .try_init();
    });
}

/// API client wired to a mock backend, in-memory storage and a recording
/// navigator.
pub struct Harness {
    pub server: MockServer,
    pub client: ApiClient,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with_timeout(Duration::from_secs(5)).await
    }

    pub async fn start_with_timeout(timeout: Duration) -> Self {
        init_tracing();

        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::at("/invoices?page=3"));
        let http = HttpClient::builder().timeout(timeout).build().expect("http client");

        let client = ApiClient::builder()
            .base_url(format!("{}/api", server.uri()))
            .storage(storage.clone())
            .navigator(navigator.clone())
            .http_client(http)
            .build()
            .expect("api client");

        Self { server, client, storage, navigator }
    }

    /// Store `A1` / `R1` as the live credential pair
    pub async fn with_session(self) -> Self {
        self.client.set_auth_tokens("A1", "R1").await.expect("store tokens");
        self
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).expect("storage read")
    }

    pub async fn requests_to(&self, path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording enabled")
            .into_iter()
            .filter(|request| request.url.path() == path)
            .collect()
    }
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|value| value.to_str().ok())
}
