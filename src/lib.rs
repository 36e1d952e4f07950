//! Authenticated, paginated client for the Twitch Helix API
//!
//! Handles the full OAuth token lifecycle: interactive login for user tokens,
//! client-credentials login for app tokens, persistence across restarts, and
//! renewal when the API rejects a token mid-flight. Resource operations are
//! typed and listings paginate lazily, fetching pages only as items are
//! consumed.

pub mod auth;
pub mod config;
pub mod error;
pub mod helix;

#[cfg(test)]
pub mod testutil;

pub use auth::{AuthPrompt, BrowserPrompt, FileTokenStore, TokenKind, TokenSet, TokenStore};
pub use config::{ClientConfig, Credentials};
pub use error::Error;
pub use helix::{
    Category, ChannelInfo, Clip, HelixClient, PagedItems, Paginator, RequestSpec, Stream,
    StreamFilter, User,
};
