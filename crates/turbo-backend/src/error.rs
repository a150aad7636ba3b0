//! Backend client error types.

use thiserror::Error;

/// Errors that can occur when talking to the managed backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The transport failed to deliver the request.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The request could not be built (empty path, bad table name...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-2xx response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// A serverless function answered with an error object.
    #[error("Function {function} failed: {message}")]
    FunctionError { function: String, message: String },

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::JsonError(e.to_string())
    }
}
