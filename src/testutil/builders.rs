//! Test data builders
//!
//! Provides builder patterns for creating test data with sensible defaults.

use chrono::{DateTime, Duration, Utc};

use crate::auth::store::{TokenKind, TokenSet};

/// Builder for creating test TokenSet objects
#[derive(Debug, Clone)]
pub struct TokenSetBuilder {
    access_token: String,
    refresh_token: Option<String>,
    scopes: Vec<String>,
    kind: TokenKind,
    expires_at: DateTime<Utc>,
}

impl Default for TokenSetBuilder {
    fn default() -> Self {
        Self {
            access_token: "access_token_123".to_string(),
            refresh_token: Some("refresh_token_456".to_string()),
            scopes: vec!["user:read:follows".to_string()],
            kind: TokenKind::User,
            expires_at: Utc::now() + Duration::hours(1),
        }
    }
}

impl TokenSetBuilder {
    /// Creates a new token builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access token
    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = access_token.into();
        self
    }

    /// Sets the refresh token
    pub fn refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the granted scopes
    pub fn scopes(mut self, scopes: Vec<&str>) -> Self {
        self.scopes = scopes.into_iter().map(String::from).collect();
        self
    }

    /// Turns this into an app token, which has no refresh token
    pub fn app(mut self) -> Self {
        self.kind = TokenKind::App;
        self.refresh_token = None;
        self
    }

    /// Sets the expiry to N hours from now; negative means already expired
    pub fn expires_in_hours(mut self, hours: i64) -> Self {
        self.expires_at = Utc::now() + Duration::hours(hours);
        self
    }

    /// Builds the TokenSet
    pub fn build(self) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            scopes: self.scopes,
            kind: self.kind,
            expires_at: self.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_builder_defaults() {
        let token = TokenSetBuilder::new().build();

        assert!(!token.access_token.is_empty());
        assert!(token.refresh_token.is_some());
        assert_eq!(token.kind, TokenKind::User);
        assert!(!token.is_expired());
    }

    #[test]
    fn token_builder_with_values() {
        let token = TokenSetBuilder::new()
            .access_token("custom_access")
            .refresh_token("custom_refresh")
            .scopes(vec!["clips:edit"])
            .expires_in_hours(-2)
            .build();

        assert_eq!(token.access_token, "custom_access");
        assert_eq!(token.refresh_token.as_deref(), Some("custom_refresh"));
        assert_eq!(token.scopes, vec!["clips:edit".to_string()]);
        assert!(token.is_expired());
    }

    #[test]
    fn app_builder_drops_the_refresh_token() {
        let token = TokenSetBuilder::new().refresh_token("r").app().build();

        assert_eq!(token.kind, TokenKind::App);
        assert!(token.refresh_token.is_none());
    }
}
