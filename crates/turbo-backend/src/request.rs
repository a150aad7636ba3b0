//! Outgoing backend requests.

use crate::BackendError;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP methods used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A fully described request, ready to be handed to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// URL without the query string.
    pub url: String,
    /// Query pairs in insertion order.
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a new request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, BackendError> {
        let json = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(json);
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Get a header value (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The full URL including the encoded query string.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect();
        format!("{}?{}", self.url, query.join("&"))
    }

    /// Parse the body back as JSON. Mostly useful when inspecting recorded requests.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Percent-encode a query component.
///
/// Unreserved characters plus the PostgREST operator punctuation (`.`, `,`,
/// `*`, `(`, `)`) are kept as-is.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'~'
            | b','
            | b'*'
            | b'('
            | b')' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url_without_query() {
        let req = Request::new(Method::Get, "https://api.example.com/rest/v1/products");
        assert_eq!(req.full_url(), "https://api.example.com/rest/v1/products");
    }

    #[test]
    fn test_full_url_encodes_values() {
        let req = Request::new(Method::Get, "https://x/rest/v1/products")
            .query("select", "*")
            .query("name", "ilike.*tee shirt*");
        assert_eq!(
            req.full_url(),
            "https://x/rest/v1/products?select=*&name=ilike.*tee%20shirt*"
        );
    }

    #[test]
    fn test_json_sets_content_type() {
        let req = Request::new(Method::Post, "https://x")
            .json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.json_body().unwrap()["a"], 1);
    }

    #[test]
    fn test_bearer_auth() {
        let req = Request::new(Method::Get, "https://x").bearer_auth("secret");
        assert_eq!(req.header_value("Authorization"), Some("Bearer secret"));
    }
}
