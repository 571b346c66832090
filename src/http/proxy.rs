//! Request forwarding.
//!
//! # Responsibilities
//! - Pick a backend from the pool for each inbound request
//! - Send an equivalent request to `backend + path?query`
//! - Relay the backend's status, headers and body untouched
//! - Map the two failure kinds to 503 and 502
//!
//! # Design Decisions
//! - Single attempt: no retry, no failover
//! - Forwarding failures never change backend liveness; only probes do
//! - Redirects are relayed, not followed
//! - The upstream timeout bounds the response headers and every gap between
//!   body frames, so a stalled backend cannot hold the client connection

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio::time;
use tower_http::timeout::TimeoutBody;

use crate::http::client::HttpClient;
use crate::http::request::request_id;
use crate::load_balancer::{backend::BackendEntry, pool::ServerPool};
use crate::observability::metrics;

/// Why a request could not be relayed.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("no live backend available")]
    NoBackendAvailable,
    #[error("backend {backend} unreachable: {reason}")]
    BackendUnreachable { backend: String, reason: String },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoBackendAvailable => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::BackendUnreachable { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProxyError::NoBackendAvailable => json!({ "error": self.to_string() }),
            ProxyError::BackendUnreachable { backend, .. } => json!({
                "error": self.to_string(),
                "backend": backend,
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Selects a backend and relays one request to it.
#[derive(Clone)]
pub struct Forwarder {
    pool: Arc<ServerPool>,
    client: HttpClient,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(pool: Arc<ServerPool>, client: HttpClient, timeout: Duration) -> Self {
        Self {
            pool,
            client,
            timeout,
        }
    }

    /// Send `request` to `backend` and return its raw response.
    pub async fn forward(
        &self,
        backend: &BackendEntry,
        request: Request<Body>,
    ) -> Result<Response, ProxyError> {
        let unreachable = |reason: String| ProxyError::BackendUnreachable {
            backend: backend.address.clone(),
            reason,
        };

        let (mut parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        parts.uri = backend
            .url_for(path_and_query)
            .parse::<Uri>()
            .map_err(|e| unreachable(e.to_string()))?;
        // The client derives Host from the backend URI.
        parts.headers.remove(header::HOST);
        parts.version = Version::HTTP_11;

        let outbound = Request::from_parts(parts, body);
        match time::timeout(self.timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => {
                let timeout = self.timeout;
                Ok(response.map(|body| Body::new(TimeoutBody::new(timeout, body))))
            }
            Ok(Err(e)) => Err(unreachable(e.to_string())),
            Err(_) => Err(unreachable(format!("timed out after {:?}", self.timeout))),
        }
    }

    /// Select and forward. Failures become their structured error responses.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let request_id = request_id(request.headers()).to_string();
        let method = request.method().to_string();
        let path = request.uri().path().to_string();

        let Some(backend) = self.pool.select() else {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "No live backend available");
            metrics::record_request(&method, 503, "none", start_time);
            return ProxyError::NoBackendAvailable.into_response();
        };

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            backend = %backend.address,
            "Proxying request"
        );

        match self.forward(&backend, request).await {
            Ok(response) => {
                metrics::record_request(&method, response.status().as_u16(), &backend.address, start_time);
                response
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Upstream error");
                metrics::record_request(&method, e.status().as_u16(), &backend.address, start_time);
                e.into_response()
            }
        }
    }
}

/// Catch-all proxy handler.
pub async fn proxy_handler(State(forwarder): State<Forwarder>, request: Request<Body>) -> Response {
    forwarder.handle(request).await
}
