use thiserror::Error;

use crate::auth::store::StoreError;

/// Top-level error type for the crate.
///
/// The variants separate the two authentication outcomes callers must treat
/// differently: `Authentication` means there is no usable session, while
/// `RefreshFailed` means the stored refresh token itself was rejected and
/// only the interactive flow can produce a new one.
#[derive(Debug, Error)]
pub enum Error {
    /// No active session, the OAuth exchange was rejected, or the API kept
    /// answering 401 after a token renewal.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The refresh token was rejected by the authorization server.
    #[error("Token refresh rejected: {0}")]
    RefreshFailed(String),

    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("Transport error: {0}")]
    Transport(#[source] anyhow::Error),

    /// Rate limited by the API. `retry_after` is the server hint in seconds.
    #[error("Rate limited by the API")]
    RateLimited { retry_after: Option<u64> },

    /// A 2xx response whose body was not the expected envelope, with the raw
    /// body for debugging.
    #[error("Failed to decode response: {message}")]
    Decode { message: String, body: String },

    /// A response item that failed conversion into its domain type, with the
    /// raw item for debugging.
    #[error("Failed to map response item: {message}")]
    Mapping {
        message: String,
        raw: serde_json::Value,
    },

    /// Any other non-success status from the API.
    #[error("API error {status}: {body}")]
    Server { status: u16, body: String },

    /// Token persistence failure surfaced by an explicit store operation.
    #[error("Token store error: {0}")]
    Storage(#[from] StoreError),
}

impl Error {
    /// Returns `true` when only interactive re-authentication can resolve
    /// this error.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::RefreshFailed(_))
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RateLimited { .. })
    }
}
