use serde_json::Value;

use super::http::Method;

/// A resource request in API terms
///
/// Holds the path and query relative to the API base URL. The executor turns
/// it into a transport request; the paginator clones it with an updated
/// cursor for each follow-up page.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    /// Creates a GET request for an API path
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request for an API path
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Appends a query parameter
    ///
    /// The same name may appear more than once, which the API uses for bulk
    /// lookups like `id=1&id=2`.
    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    /// Sets a JSON body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns a copy of this request positioned at a pagination cursor
    pub fn with_cursor(&self, cursor: &str) -> Self {
        let mut next = self.clone();
        next.query.retain(|(name, _)| name != "after");
        next.query.push(("after".to_string(), cursor.to_string()));
        next
    }

    /// Renders the full URL against a base, percent-encoding query values
    pub fn url(&self, base_url: &str) -> String {
        if self.query.is_empty() {
            return format!("{}{}", base_url, self.path);
        }

        let pairs = self
            .query
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}{}?{}", base_url, self.path, pairs)
    }
}
