//! Scripted transport for testing.
//!
//! `MockTransport` plays back queued responses in order and records every
//! request it receives, so code built on the SDK can be tested without a
//! running service.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Record of a request seen by the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub method: Method,
    /// Rendered path, parameters not encoded (e.g. "/repositories/repo/pulls")
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Request body as text
    pub body: Option<String>,
    /// Timestamp of the call
    pub timestamp: DateTime<Utc>,
}

impl MockCall {
    fn from_request(request: &ApiRequest) -> Self {
        Self {
            method: request.method.clone(),
            path: request.path(),
            query: request.query.clone(),
            body: request.body_text(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<ApiResponse, TransportError>>,
    calls: Vec<MockCall>,
}

/// Transport that answers from a queue of scripted responses.
///
/// When the queue is empty, `invoke` fails with `TransportError::Request`.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push_response(&self, response: ApiResponse) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .responses
            .push_back(Ok(response));
    }

    /// Queue a JSON response with the given status.
    pub fn push_json(&self, status: u16, body: Value) {
        self.push_response(ApiResponse::new(status, body.to_string()));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .responses
            .push_back(Err(error));
    }

    /// Number of scripted responses not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .responses
            .len()
    }

    /// All recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .len()
    }

    /// Check if a request with this method and rendered path was made.
    #[must_use]
    pub fn was_called(&self, method: &Method, path: &str) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .iter()
            .any(|call| call.method == *method && call.path == path)
    }

    /// Drop recorded calls and queued responses.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.clear();
        state.responses.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn invoke(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(MockCall::from_request(&request));
        state.responses.pop_front().unwrap_or_else(|| {
            Err(TransportError::Request(format!(
                "no scripted response for {} {}",
                request.method,
                request.path()
            )))
        })
    }
}
