use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const SERVICE_NAME: &str = "helix-client";

/// Kind of OAuth token, which determines how it is renewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Authorization-code token tied to a user; renewed with the refresh token
    User,
    /// Client-credentials token; renewed by requesting a fresh one
    App,
}

/// OAuth token data
///
/// Replaced wholesale on every renewal, never updated field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    /// Absent for app tokens, which cannot be refreshed
    pub refresh_token: Option<String>,
    pub scopes: Vec<String>,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Checks that every requested scope is covered by this token
    pub fn covers_scopes(&self, requested: &[&str]) -> bool {
        requested
            .iter()
            .all(|req| self.scopes.iter().any(|have| have.as_str() == *req))
    }
}

/// Token store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to encode token: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Trait for token persistence, keyed by client id
///
/// This abstraction allows easy mocking of token storage in tests.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Saves the token for a client id
    async fn save(&self, client_id: &str, token: &TokenSet) -> Result<(), StoreError>;

    /// Loads the stored token for a client id
    ///
    /// An absent, unreadable or corrupt entry yields `None`; callers treat
    /// every one of those as "not logged in".
    async fn load(&self, client_id: &str) -> Option<TokenSet>;

    /// Deletes the stored token for a client id
    async fn delete(&self, client_id: &str) -> Result<(), StoreError>;
}

/// Token storage using the file system with a keyring secondary copy
///
/// The JSON file is the primary store; keyring writes are best effort so an
/// unavailable secret service never breaks a session.
pub struct FileTokenStore {
    dir: PathBuf,
    use_keyring: bool,
}

impl FileTokenStore {
    /// Creates a store under the platform config directory
    pub fn new() -> Result<Self, StoreError> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(SERVICE_NAME)
            .join("tokens");
        std::fs::create_dir_all(&dir).context("Failed to create token directory")?;

        Ok(Self {
            dir,
            use_keyring: true,
        })
    }

    /// Creates a store rooted at a custom directory, without keyring
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context("Failed to create token directory")?;

        Ok(Self {
            dir,
            use_keyring: false,
        })
    }

    fn token_path(&self, client_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", client_id))
    }

    fn keyring_entry(&self, client_id: &str) -> Option<keyring::Entry> {
        if !self.use_keyring {
            return None;
        }
        keyring::Entry::new(SERVICE_NAME, client_id).ok()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, client_id: &str, token: &TokenSet) -> Result<(), StoreError> {
        let data = serde_json::to_string(token)?;
        let path = self.token_path(client_id);

        // Write then rename so a crash mid-write never leaves a torn token
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &data)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        // Also try keyring as a secondary store
        if let Some(entry) = self.keyring_entry(client_id) {
            let _ = entry.set_password(&data);
        }

        Ok(())
    }

    async fn load(&self, client_id: &str) -> Option<TokenSet> {
        let path = self.token_path(client_id);

        // Try file storage first (more reliable)
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(token) => return Some(token),
                    Err(e) => {
                        tracing::warn!("Stored token at {} is corrupt: {}", path.display(), e);
                        return None;
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read token file {}: {}", path.display(), e);
                    return None;
                }
            }
        }

        // Fall back to keyring
        if let Some(entry) = self.keyring_entry(client_id) {
            if let Ok(data) = entry.get_password() {
                match serde_json::from_str(&data) {
                    Ok(token) => return Some(token),
                    Err(e) => {
                        tracing::warn!("Keyring token for {} is corrupt: {}", client_id, e);
                    }
                }
            }
        }

        None
    }

    async fn delete(&self, client_id: &str) -> Result<(), StoreError> {
        let path = self.token_path(client_id);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
        }

        // Also try to delete from keyring
        if let Some(entry) = self.keyring_entry(client_id) {
            let _ = entry.delete_credential();
        }

        Ok(())
    }
}
