//! Executes rendered requests, either over the network or against the mock.

use std::sync::Arc;

use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::mock::{MockStore, SharedStore};

/// Turns an `HttpRequest` into an `HttpResponse`. A non-2xx status is a
/// response, not an error; only a failed round-trip returns `Err`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;

    /// The in-memory store behind a mock transport.
    fn mock_store(&self) -> Option<SharedStore> {
        None
    }
}

/// Live transport backed by a blocking `ureq` agent.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        // Status interpretation belongs to `request::check_status`.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(&url), &headers), body.as_deref()),
            HttpMethod::Put => send(with_headers(self.agent.put(&url), &headers), body.as_deref()),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Serves every request from an in-memory `MockStore`.
#[derive(Debug, Clone)]
pub struct MockTransport {
    store: SharedStore,
}

impl MockTransport {
    /// A transport over a fresh store whose session user is `username`.
    pub fn new(username: &str) -> Self {
        Self::with_store(MockStore::shared(username))
    }

    /// Share an existing store, e.g. with the HTTP mock server.
    pub fn with_store(store: SharedStore) -> Self {
        Self { store }
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| ApiError::Transport("mock store lock poisoned".to_string()))?;
        Ok(store.dispatch(&request))
    }

    fn mock_store(&self) -> Option<SharedStore> {
        Some(Arc::clone(&self.store))
    }
}
