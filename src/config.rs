use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";
const AUTH_BASE_URL: &str = "https://id.twitch.tv/oauth2";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000";

/// OAuth application credentials
///
/// Issued by the Twitch developer console. Immutable once loaded.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Creates credentials from a client id and secret
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

// The secret must never end up in logs, so Debug masks it
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Client configuration
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    /// Redirect URI registered for the application; the authorization code
    /// arrives as a query parameter on this URL.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    /// How many items to request per page on listing endpoints
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Skip response items that fail domain conversion instead of failing
    /// the whole listing
    #[serde(default)]
    pub skip_malformed: bool,
}

fn default_api_base_url() -> String {
    HELIX_BASE_URL.to_string()
}

fn default_auth_base_url() -> String {
    AUTH_BASE_URL.to_string()
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_page_size() -> u32 {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            auth_base_url: default_auth_base_url(),
            redirect_uri: default_redirect_uri(),
            http_timeout_secs: default_http_timeout(),
            page_size: default_page_size(),
            skip_malformed: false,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).context("Failed to read config file")?;
        serde_json::from_str(&data).context("Failed to parse config file")
    }
}
