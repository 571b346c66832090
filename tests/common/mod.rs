//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use rr_balancer::{BalancerConfig, HttpServer, ServerPool, Shutdown};

/// A running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    pub healthy: Arc<AtomicBool>,
    pub hits: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    name: &'static str,
    backend: MockBackend,
}

/// Start a backend that answers `/health` per its `healthy` flag, redirects
/// `/redirect`, and echoes every other request as JSON.
pub async fn start_mock_backend(name: &'static str) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = MockBackend {
        addr: listener.local_addr().unwrap(),
        healthy: Arc::new(AtomicBool::new(true)),
        hits: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/redirect", get(|| async { Redirect::temporary("/elsewhere") }))
        .fallback(echo)
        .with_state(MockState {
            name,
            backend: backend.clone(),
        });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    backend
}

async fn health(State(state): State<MockState>) -> StatusCode {
    if state.backend.healthy.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn echo(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.backend.hits.fetch_add(1, Ordering::SeqCst);
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    (
        StatusCode::OK,
        [("x-backend", state.name), ("set-cookie", "served=1")],
        Json(json!({
            "backend": state.name,
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query().unwrap_or_default(),
            "host": header_str(header::HOST),
            "cookie": header_str(header::COOKIE),
            "body": body,
        })),
    )
}

/// An address nothing listens on.
#[allow(dead_code)]
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A running balancer.
#[allow(dead_code)]
pub struct TestBalancer {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub pool: Arc<ServerPool>,
    pub shutdown: Shutdown,
    pub task: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestBalancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.admin_addr, path)
    }
}

/// Config with the given backends, health checks off and metrics off.
#[allow(dead_code)]
pub fn config_for(backends: &[String]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.backends = backends
        .iter()
        .map(|b| rr_balancer::config::BackendConfig::new(b.clone()))
        .collect();
    config.health_check.enabled = false;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    config.timeouts.upstream_secs = 2;
    config.observability.metrics_enabled = false;
    config
}

pub async fn start_balancer(config: BalancerConfig) -> TestBalancer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let pool = server.pool();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(server.run(listener, Some(admin_listener), shutdown.subscribe()));

    TestBalancer {
        addr,
        admin_addr,
        pool,
        shutdown,
        task,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
