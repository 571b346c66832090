//! Single-backend liveness probe.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::http::client::{build_client, HttpClient};

/// Issues `GET {address}{path}` with a hard timeout.
#[derive(Clone)]
pub struct HealthProber {
    client: HttpClient,
    path: String,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(config: &HealthCheckConfig) -> Self {
        Self::with_client(build_client(), config)
    }

    pub fn with_client(client: HttpClient, config: &HealthCheckConfig) -> Self {
        Self {
            client,
            path: config.path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// True iff the backend answered 2xx within the timeout.
    ///
    /// Timeouts, connection errors and non-2xx statuses all count as not alive.
    pub async fn probe(&self, address: &str) -> bool {
        let uri = format!("{}{}", address, self.path);
        let request = match Request::builder()
            .method(Method::GET)
            .uri(&uri)
            .header(header::USER_AGENT, "rr-balancer-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(uri = %uri, error = %e, "Failed to build health check request");
                return false;
            }
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::debug!(address = %address, status = %response.status(), "Health check failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::debug!(address = %address, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::debug!(address = %address, timeout = ?self.timeout, "Health check failed: timeout");
                false
            }
        }
    }
}
