//! Test fixtures
//!
//! Pre-built test data for common testing scenarios.

use serde_json::{json, Value};

use crate::config::{ClientConfig, Credentials};

/// Client configuration pointing at made-up test hosts
pub fn test_config() -> ClientConfig {
    ClientConfig {
        api_base_url: "https://api.example.test/helix".to_string(),
        auth_base_url: "https://id.example.test/oauth2".to_string(),
        ..ClientConfig::default()
    }
}

/// Throwaway application credentials
pub fn test_credentials() -> Credentials {
    Credentials::new("cid123", "shh_secret")
}

/// Creates a paged response body in the API's `data`/`pagination` envelope
pub fn data_envelope(items: Vec<Value>, cursor: Option<&str>) -> String {
    let envelope = match cursor {
        Some(cursor) => json!({"data": items, "pagination": {"cursor": cursor}}),
        None => json!({"data": items, "pagination": {}}),
    };
    envelope.to_string()
}

/// Creates a token endpoint response body
pub fn token_response_json(
    access_token: &str,
    refresh_token: Option<&str>,
    expires_in: i64,
    scopes: &[&str],
) -> String {
    let mut response = json!({
        "access_token": access_token,
        "expires_in": expires_in,
        "token_type": "bearer"
    });
    if let Some(refresh_token) = refresh_token {
        response["refresh_token"] = json!(refresh_token);
    }
    if !scopes.is_empty() {
        response["scope"] = json!(scopes);
    }
    response.to_string()
}

/// Creates a user item in the API's shape
pub fn user_json(id: &str, login: &str) -> Value {
    json!({
        "id": id,
        "login": login,
        "display_name": login,
        "broadcaster_type": "",
        "description": "",
        "profile_image_url": format!("https://example.com/{}.png", login),
        "created_at": "2020-01-01T00:00:00Z"
    })
}

/// Creates a live stream item in the API's shape
pub fn stream_json(id: &str, user_login: &str) -> Value {
    json!({
        "id": id,
        "user_id": format!("u{}", id),
        "user_login": user_login,
        "user_name": user_login,
        "game_id": "509658",
        "game_name": "Just Chatting",
        "title": format!("{} is live", user_login),
        "viewer_count": 1000,
        "started_at": "2024-03-01T18:05:00Z",
        "thumbnail_url": "https://example.com/thumb.jpg",
        "tags": ["English"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helix::types::{Stream, User};

    #[test]
    fn envelope_with_cursor() {
        let body = data_envelope(vec![json!({"id": "1"})], Some("abc"));
        let parsed: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(parsed["data"][0]["id"], "1");
        assert_eq!(parsed["pagination"]["cursor"], "abc");
    }

    #[test]
    fn envelope_without_cursor() {
        let body = data_envelope(vec![], None);
        let parsed: Value = serde_json::from_str(&body).unwrap();

        assert!(parsed["pagination"].get("cursor").is_none());
    }

    #[test]
    fn user_fixture_maps_to_the_domain_type() {
        let user: User = serde_json::from_value(user_json("1", "somebody")).unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(user.login, "somebody");
    }

    #[test]
    fn stream_fixture_maps_to_the_domain_type() {
        let stream: Stream = serde_json::from_value(stream_json("42", "somebody")).unwrap();
        assert_eq!(stream.id, "42");
        assert_eq!(stream.user_login, "somebody");
    }

    #[test]
    fn token_response_omits_absent_fields() {
        let body = token_response_json("a", None, 3600, &[]);
        let parsed: Value = serde_json::from_str(&body).unwrap();

        assert!(parsed.get("refresh_token").is_none());
        assert!(parsed.get("scope").is_none());
    }
}
