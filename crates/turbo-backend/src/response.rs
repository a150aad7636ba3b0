//! Backend response handling.

use crate::BackendError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// A response from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A response with a JSON body.
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self::new(status, headers, value.to_string().into_bytes())
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, BackendError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| BackendError::ParseError(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        serde_json::from_slice(&self.body).map_err(|e| BackendError::ParseError(e.to_string()))
    }

    /// Get a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    ///
    /// The backend reports failures as `{"message": ...}` or `{"error": ...}`;
    /// either is used as the error message when present.
    pub fn error_for_status(self) -> Result<Self, BackendError> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self
            .json::<serde_json::Value>()
            .ok()
            .and_then(|v| error_message(&v))
            .or_else(|| self.text().ok().filter(|t| !t.is_empty()))
            .unwrap_or_else(|| "Unknown error".to_string());
        Err(BackendError::HttpError {
            status: self.status,
            message,
        })
    }
}

/// Extract a human-readable message from a backend error object.
pub(crate) fn error_message(value: &serde_json::Value) -> Option<String> {
    let field = value.get("error").or_else(|| value.get("message"))?;
    match field {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .or_else(|| Some(field.to_string())),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_response(status: u16, body: &[u8]) -> Response {
        Response::new(status, HashMap::new(), body.to_vec())
    }

    #[test]
    fn test_response_is_success() {
        assert!(make_response(200, b"").is_success());
        assert!(make_response(204, b"").is_success());
        assert!(!make_response(199, b"").is_success());
        assert!(!make_response(404, b"").is_success());
    }

    #[test]
    fn test_response_json() {
        let resp = Response::json_body(200, &json!({"id": "p1"}));
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(resp.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_error_for_status_uses_message_field() {
        let resp = Response::json_body(400, &json!({"message": "duplicate key"}));
        let err = resp.error_for_status().unwrap_err();
        assert_eq!(
            err,
            BackendError::HttpError {
                status: 400,
                message: "duplicate key".to_string()
            }
        );
    }

    #[test]
    fn test_error_for_status_falls_back_to_text() {
        let err = make_response(502, b"Bad Gateway")
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_error_message_nested_object() {
        let value = json!({"error": {"message": "quota exceeded", "code": 429}});
        assert_eq!(error_message(&value).as_deref(), Some("quota exceeded"));
        assert_eq!(error_message(&json!({"error": null})), None);
    }
}
