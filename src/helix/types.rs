use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::RequestSpec;

/// Represents a Twitch user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Represents a live stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewer_count: i64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Represents a channel's broadcast settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub broadcaster_id: String,
    pub broadcaster_login: String,
    pub broadcaster_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub delay: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Represents a Twitch category/game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub box_art_url: String,
}

/// Represents a freshly created clip
///
/// Creation is asynchronous on the API side, so only the id and the edit
/// URL come back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    pub edit_url: String,
}

/// Filter for live stream listings
#[derive(Debug, Clone, Default)]
pub struct StreamFilter {
    game_id: Option<String>,
    user_login: Option<String>,
    language: Option<String>,
}

impl StreamFilter {
    /// Creates an empty filter matching every stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to one game
    pub fn game_id(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = Some(game_id.into());
        self
    }

    /// Restricts results to one broadcaster login
    pub fn user_login(mut self, user_login: impl Into<String>) -> Self {
        self.user_login = Some(user_login.into());
        self
    }

    /// Restricts results to one broadcast language
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub(crate) fn apply(&self, mut request: RequestSpec) -> RequestSpec {
        if let Some(game_id) = &self.game_id {
            request = request.query("game_id", game_id);
        }
        if let Some(user_login) = &self.user_login {
            request = request.query("user_login", user_login);
        }
        if let Some(language) = &self.language {
            request = request.query("language", language);
        }
        request
    }
}
