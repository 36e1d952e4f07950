use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::prompt::AuthPrompt;
use super::store::{TokenKind, TokenSet};
use crate::config::{ClientConfig, Credentials};
use crate::error::Error;
use crate::helix::http::{HttpRequest, HttpTransport};

/// Response from the token endpoint
///
/// Client-credentials grants come back without a refresh token or scopes,
/// so those fields default.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default)]
    scope: Vec<String>,
}

/// Response from token validation
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatedToken {
    pub client_id: String,
    /// Absent for app tokens
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Absent for app tokens
    #[serde(default)]
    pub user_id: Option<String>,
    pub expires_in: i64,
}

/// OAuth token acquisition and renewal
///
/// Owns every exchange with the authorization server: the interactive
/// authorization-code flow, the client-credentials flow, refresh-token
/// exchange and validation. Resource requests never come through here.
pub struct TokenProvider<H: HttpTransport> {
    http: Arc<H>,
    credentials: Credentials,
    auth_base_url: String,
    redirect_uri: String,
}

impl<H: HttpTransport> TokenProvider<H> {
    /// Creates a provider over a transport
    pub fn new(http: Arc<H>, credentials: Credentials, config: &ClientConfig) -> Self {
        Self {
            http,
            credentials,
            auth_base_url: config.auth_base_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    /// URL the user must visit to authorize the requested scopes
    fn authorize_url(&self, scopes: &[&str]) -> String {
        format!(
            "{}/authorize?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.auth_base_url,
            self.credentials.client_id,
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes.join(" "))
        )
    }

    /// Runs the authorization-code flow for a user token
    ///
    /// Suspends on the prompt until the user finishes the consent page, then
    /// exchanges the redirect code at the token endpoint.
    pub async fn authenticate_user(
        &self,
        scopes: &[&str],
        prompt: &dyn AuthPrompt,
    ) -> Result<TokenSet, Error> {
        let url = self.authorize_url(scopes);
        tracing::info!("Waiting for user authorization");

        let code = prompt
            .display_url_and_await_code(&url)
            .await
            .map_err(|e| Error::Authentication(format!("authorization prompt failed: {}", e)))?;

        let params = vec![
            ("client_id".to_string(), self.credentials.client_id.clone()),
            (
                "client_secret".to_string(),
                self.credentials.client_secret.clone(),
            ),
            ("code".to_string(), code),
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("redirect_uri".to_string(), self.redirect_uri.clone()),
        ];

        let token = self.request_token(params, TokenKind::User).await?;
        tracing::info!("User token obtained");
        Ok(token)
    }

    /// Requests an app access token via the client-credentials grant
    pub async fn authenticate_app(&self) -> Result<TokenSet, Error> {
        let params = vec![
            ("client_id".to_string(), self.credentials.client_id.clone()),
            (
                "client_secret".to_string(),
                self.credentials.client_secret.clone(),
            ),
            ("grant_type".to_string(), "client_credentials".to_string()),
        ];

        let token = self.request_token(params, TokenKind::App).await?;
        tracing::info!("App token obtained");
        Ok(token)
    }

    /// Exchanges a refresh token for a replacement token set
    ///
    /// A rejected refresh token comes back as `Error::RefreshFailed`, which
    /// means the caller has to run the interactive flow again.
    pub async fn refresh(&self, current: &TokenSet) -> Result<TokenSet, Error> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::RefreshFailed("no refresh token available".to_string()))?;

        let params = vec![
            ("client_id".to_string(), self.credentials.client_id.clone()),
            (
                "client_secret".to_string(),
                self.credentials.client_secret.clone(),
            ),
            ("refresh_token".to_string(), refresh_token.to_string()),
            ("grant_type".to_string(), "refresh_token".to_string()),
        ];

        let request =
            HttpRequest::post(format!("{}/token", self.auth_base_url)).with_form(params);
        let response = self.http.execute(request).await.map_err(Error::Transport)?;

        if matches!(response.status, 400 | 401 | 403) {
            tracing::warn!(
                "Refresh token rejected: {} - {}",
                response.status,
                response.body
            );
            return Err(Error::RefreshFailed(format!(
                "refresh token rejected with status {}",
                response.status
            )));
        }
        if !response.is_success() {
            return Err(Error::Server {
                status: response.status,
                body: response.body,
            });
        }

        let tr: TokenResponse = response.json().map_err(|e| Error::Decode {
            message: e.to_string(),
            body: response.body.clone(),
        })?;

        // The server may rotate the refresh token; keep the old one only
        // when no replacement came back
        let refresh_token = tr.refresh_token.or_else(|| current.refresh_token.clone());
        let scopes = if tr.scope.is_empty() {
            current.scopes.clone()
        } else {
            tr.scope
        };

        Ok(TokenSet {
            access_token: tr.access_token,
            refresh_token,
            scopes,
            kind: current.kind,
            expires_at: Utc::now() + Duration::seconds(tr.expires_in),
        })
    }

    /// Checks a token against the validation endpoint
    pub async fn validate(&self, access_token: &str) -> Result<ValidatedToken, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("OAuth {}", access_token).parse().unwrap(),
        );

        let request =
            HttpRequest::get(format!("{}/validate", self.auth_base_url)).with_headers(headers);
        let response = self.http.execute(request).await.map_err(Error::Transport)?;

        if response.is_unauthorized() {
            return Err(Error::Authentication(
                "token expired or invalid".to_string(),
            ));
        }
        if !response.is_success() {
            return Err(Error::Server {
                status: response.status,
                body: response.body,
            });
        }

        response.json().map_err(|e| Error::Decode {
            message: e.to_string(),
            body: response.body.clone(),
        })
    }

    async fn request_token(
        &self,
        params: Vec<(String, String)>,
        kind: TokenKind,
    ) -> Result<TokenSet, Error> {
        let request =
            HttpRequest::post(format!("{}/token", self.auth_base_url)).with_form(params);
        let response = self.http.execute(request).await.map_err(Error::Transport)?;

        if !response.is_success() {
            tracing::warn!(
                "Token request failed: {} - {}",
                response.status,
                response.body
            );
            return Err(Error::Authentication(format!(
                "token endpoint returned {}: {}",
                response.status, response.body
            )));
        }

        let tr: TokenResponse = response.json().map_err(|e| Error::Decode {
            message: e.to_string(),
            body: response.body.clone(),
        })?;

        Ok(TokenSet {
            access_token: tr.access_token,
            refresh_token: tr.refresh_token,
            scopes: tr.scope,
            kind,
            expires_at: Utc::now() + Duration::seconds(tr.expires_in),
        })
    }
}

impl<H: HttpTransport> Clone for TokenProvider<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            credentials: self.credentials.clone(),
            auth_base_url: self.auth_base_url.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }
}
