use chrono::Utc;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::http::{HttpRequest, HttpResponse, HttpTransport, Method};
use super::request::RequestSpec;
use crate::auth::provider::TokenProvider;
use crate::auth::store::{TokenKind, TokenSet, TokenStore};
use crate::error::Error;

/// Sends authenticated requests and renews the session token on rejection
///
/// The executor holds the active session. When the API answers 401 it renews
/// the token once (by its kind) and retries the request once; a second 401
/// means re-authentication is needed and surfaces as an error. Concurrent
/// rejections share a single renewal through `refresh_lock`.
pub struct RequestExecutor<H: HttpTransport> {
    http: Arc<H>,
    provider: TokenProvider<H>,
    store: Arc<dyn TokenStore>,
    session: Arc<RwLock<Option<TokenSet>>>,
    refresh_lock: Arc<Mutex<()>>,
    client_id: String,
    api_base_url: String,
}

impl<H: HttpTransport> RequestExecutor<H> {
    pub(crate) fn new(
        http: Arc<H>,
        provider: TokenProvider<H>,
        store: Arc<dyn TokenStore>,
        client_id: String,
        api_base_url: String,
    ) -> Self {
        Self {
            http,
            provider,
            store,
            session: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
            client_id,
            api_base_url,
        }
    }

    pub(crate) async fn set_session(&self, token: TokenSet) {
        *self.session.write().await = Some(token);
    }

    pub(crate) async fn session(&self) -> Option<TokenSet> {
        self.session.read().await.clone()
    }

    pub(crate) async fn clear_session(&self) {
        *self.session.write().await = None;
    }

    /// Executes a resource request with the active session token
    ///
    /// Returns the response for any status the caller should interpret as
    /// data; auth failures, rate limits and server errors become typed
    /// errors.
    pub async fn execute(&self, request: &RequestSpec) -> Result<HttpResponse, Error> {
        let token = self
            .session
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::Authentication("no active session".to_string()))?;

        let response = self.send(request, &token).await?;
        if !response.is_unauthorized() {
            return self.map_status(response);
        }

        let renewed = self.renew_session(&token).await?;
        let retried = self.send(request, &renewed).await?;
        if retried.is_unauthorized() {
            return Err(Error::Authentication(
                "request unauthorized after token renewal".to_string(),
            ));
        }
        self.map_status(retried)
    }

    async fn send(&self, request: &RequestSpec, token: &TokenSet) -> Result<HttpResponse, Error> {
        let url = request.url(&self.api_base_url);
        tracing::debug!("Request: {:?} {}", request.method, url);

        let mut http_request = match request.method {
            Method::Get => HttpRequest::get(url),
            Method::Post => HttpRequest::post(url),
        };
        http_request = http_request.with_headers(self.build_headers(token));
        if let Some(body) = &request.body {
            http_request = http_request.with_json(body.clone());
        }

        self.http
            .execute(http_request)
            .await
            .map_err(Error::Transport)
    }

    fn build_headers(&self, token: &TokenSet) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", token.access_token).parse().unwrap(),
        );
        headers.insert("Client-Id", self.client_id.parse().unwrap());
        headers
    }

    fn map_status(&self, response: HttpResponse) -> Result<HttpResponse, Error> {
        if response.is_success() {
            return Ok(response);
        }
        if response.is_rate_limited() {
            // Retry-After is seconds; Ratelimit-Reset is an epoch timestamp
            let retry_after = response
                .header("retry-after")
                .and_then(|value| value.parse::<u64>().ok())
                .or_else(|| {
                    response.header("ratelimit-reset").and_then(|value| {
                        let reset = value.parse::<i64>().ok()?;
                        Some((reset - Utc::now().timestamp()).max(0) as u64)
                    })
                });
            return Err(Error::RateLimited { retry_after });
        }
        Err(Error::Server {
            status: response.status,
            body: response.body,
        })
    }

    /// Renews the session after the API rejected `stale`
    ///
    /// Serialized across tasks: whoever holds the lock renews, everyone else
    /// finds the replacement already published and uses it.
    async fn renew_session(&self, stale: &TokenSet) -> Result<TokenSet, Error> {
        let _guard = self.refresh_lock.lock().await;

        // Another task may have renewed while we waited for the lock
        if let Some(current) = self.session.read().await.clone() {
            if current.access_token != stale.access_token {
                return Ok(current);
            }
        }

        tracing::info!("Session token rejected, renewing");
        let renewed = match stale.kind {
            TokenKind::User => self.provider.refresh(stale).await?,
            TokenKind::App => self.provider.authenticate_app().await?,
        };

        if let Err(e) = self.store.save(&self.client_id, &renewed).await {
            tracing::warn!("Failed to persist renewed token: {}", e);
        }
        *self.session.write().await = Some(renewed.clone());

        Ok(renewed)
    }
}

impl<H: HttpTransport> Clone for RequestExecutor<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            provider: self.provider.clone(),
            store: self.store.clone(),
            session: self.session.clone(),
            refresh_lock: self.refresh_lock.clone(),
            client_id: self.client_id.clone(),
            api_base_url: self.api_base_url.clone(),
        }
    }
}
