//! Common test utilities for integration tests

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

use helix_client::helix::ReqwestTransport;
use helix_client::{
    AuthPrompt, ClientConfig, Credentials, FileTokenStore, HelixClient, TokenStore,
};

/// Prompt that immediately answers with a fixed authorization code
pub struct AutoPrompt(pub String);

#[async_trait]
impl AuthPrompt for AutoPrompt {
    async fn display_url_and_await_code(&self, _url: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

/// Starts a mock server and a client wired to it, storing tokens under `dir`
pub async fn setup(dir: &Path) -> (MockServer, HelixClient) {
    setup_client(dir, false).await
}

/// Same as [`setup`] but with malformed items skipped instead of failing
pub async fn setup_skipping_malformed(dir: &Path) -> (MockServer, HelixClient) {
    setup_client(dir, true).await
}

async fn setup_client(dir: &Path, skip_malformed: bool) -> (MockServer, HelixClient) {
    let server = MockServer::start().await;

    let config = ClientConfig {
        api_base_url: server.uri(),
        auth_base_url: format!("{}/oauth2", server.uri()),
        redirect_uri: "http://localhost:3030/callback".to_string(),
        http_timeout_secs: 5,
        page_size: 100,
        skip_malformed,
    };
    let credentials = Credentials::new("itest-client", "itest-secret");
    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(5)));
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::with_dir(dir).unwrap());

    let client = HelixClient::with_transport(config, credentials, transport, store);
    (server, client)
}
