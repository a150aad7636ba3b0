//! Pluggable request transport.
//!
//! The builder never talks to the network itself: the host application
//! supplies a [`Transport`] and every backend call goes through it as one
//! atomic request/response exchange (no retry, no timeout).

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{BackendError, Request, Response};

/// Delivers a request and returns the raw response.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response, BackendError>;
}

/// Scripted transport: answers requests from a queue and records them.
///
/// Used by tests and local previews where no backend is reachable.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Response, BackendError>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push_response(&self, response: Response) {
        self.lock_responses().push_back(Ok(response));
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, value: serde_json::Value) {
        self.push_response(Response::json_body(status, &value));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: BackendError) {
        self.lock_responses().push_back(Err(error));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<Request> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.requests().pop()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<Response, BackendError>>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response, BackendError> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }
        self.lock_responses().pop_front().unwrap_or_else(|| {
            Err(BackendError::RequestError(format!(
                "no scripted response for {} {}",
                request.method.as_str(),
                request.url
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn test_mock_answers_in_order() {
        let mock = MockTransport::new();
        mock.push_json(200, serde_json::json!({"n": 1}));
        mock.push_json(201, serde_json::json!({"n": 2}));

        let req = Request::new(Method::Get, "https://x/a");
        assert_eq!(mock.send(&req).unwrap().status, 200);
        assert_eq!(mock.send(&req).unwrap().status, 201);
        assert_eq!(mock.requests().len(), 2);
    }

    #[test]
    fn test_mock_empty_queue_is_error() {
        let mock = MockTransport::new();
        let req = Request::new(Method::Post, "https://x/functions/v1/clone-brand");
        let err = mock.send(&req).unwrap_err();
        assert!(matches!(err, BackendError::RequestError(_)));
        assert_eq!(mock.last_request().unwrap().url, req.url);
    }
}
