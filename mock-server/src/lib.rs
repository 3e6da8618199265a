//! HTTP front for the in-memory Zendesk mock.
//!
//! Every request under `/api/v2` is turned back into the plain-data
//! `HttpRequest` the core transports use and answered by
//! `MockStore::dispatch`, so the live `HttpTransport` sees exactly the
//! responses a mock client would.

use std::sync::PoisonError;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use zendesk_core::{HttpMethod, HttpRequest, HttpResponse, MockStore, SharedStore};

/// Session user of a store created by `app()`.
pub const DEFAULT_USERNAME: &str = "admin@example.com";

/// A router over a fresh store.
pub fn app() -> Router {
    router(MockStore::shared(DEFAULT_USERNAME))
}

/// A router over `store`, which callers may keep a handle to.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/v2/{*path}", any(forward))
        .fallback(not_found)
        .with_state(store)
}

pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "zendesk mock listening");
    }
    axum::serve(listener, router(store)).await
}

async fn forward(
    State(store): State<SharedStore>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some(method) = HttpMethod::parse(method.as_str()) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let target = uri.path_and_query().map_or(uri.path(), |target| target.as_str());

    let request = HttpRequest {
        method,
        url: format!("http://{host}{target}"),
        headers: Vec::new(),
        body: (!body.is_empty()).then_some(body),
    };
    let response = store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .dispatch(&request);
    if response.status >= 400 {
        warn!(method = %request.method, url = %request.url, status = response.status, "mock request failed");
    }
    into_response(response)
}

async fn not_found(uri: Uri) -> Response {
    let body = serde_json::json!({
        "error": "InvalidEndpoint",
        "description": format!("Not found: {}", uri.path()),
    });
    (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
}

fn into_response(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(response.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_status_and_headers_are_kept() {
        let response = into_response(HttpResponse::json(201, &serde_json::json!({"user": {"id": 1}})));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn unknown_status_becomes_server_error() {
        let response = into_response(HttpResponse::empty(1000));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
