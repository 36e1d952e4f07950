//! OAuth token lifecycle
//!
//! Covers acquiring tokens (interactive authorization-code flow for user
//! tokens, client-credentials flow for app tokens), renewing them when the
//! API rejects one, and persisting them across process restarts.

pub mod prompt;
pub mod provider;
pub mod store;

pub use prompt::{AuthPrompt, BrowserPrompt};
pub use provider::{TokenProvider, ValidatedToken};
pub use store::{FileTokenStore, StoreError, TokenKind, TokenSet, TokenStore};
