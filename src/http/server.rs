//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that proxies every path
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve the proxy and admin listeners
//! - Run the health monitor alongside them until shutdown

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, PoolAdmin};
use crate::config::BalancerConfig;
use crate::health::{HealthMonitor, HealthProber};
use crate::http::client::build_client;
use crate::http::proxy::{proxy_handler, Forwarder};
use crate::http::request::MakeRequestUuidV4;
use crate::load_balancer::pool::ServerPool;

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    pool: Arc<ServerPool>,
    prober: HealthProber,
}

impl HttpServer {
    /// Create a server whose pool is seeded from `config.backends`.
    pub fn new(config: BalancerConfig) -> Self {
        let pool = Arc::new(ServerPool::from_config(&config.backends));
        Self::with_pool(config, pool)
    }

    /// Create a server around an existing pool.
    pub fn with_pool(config: BalancerConfig, pool: Arc<ServerPool>) -> Self {
        let client = build_client();
        let forwarder = Forwarder::new(
            pool.clone(),
            client.clone(),
            Duration::from_secs(config.timeouts.upstream_secs),
        );
        let prober = HealthProber::with_client(client, &config.health_check);

        let router = Self::build_router(&config, forwarder);
        Self {
            router,
            config,
            pool,
            prober,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BalancerConfig, forwarder: Forwarder) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(forwarder)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
    }

    pub fn pool(&self) -> Arc<ServerPool> {
        self.pool.clone()
    }

    /// Admin operations bound to this server's pool.
    pub fn admin(&self) -> PoolAdmin {
        PoolAdmin::new(self.pool.clone(), self.prober.clone())
    }

    /// Serve until `shutdown` fires.
    ///
    /// The admin surface is served on `admin_listener` when given. The health
    /// monitor and admin server are stopped once the proxy listener has drained,
    /// so a signal sent before this call still stops them.
    pub async fn run(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, backends = self.pool.len(), "HTTP server starting");

        let monitor = HealthMonitor::with_prober(
            self.pool.clone(),
            self.prober.clone(),
            self.config.health_check.clone(),
        );
        let (stop_tx, _) = broadcast::channel::<()>(1);
        let monitor_task = tokio::spawn(monitor.run(stop_tx.subscribe()));

        let admin_task = admin_listener.map(|admin_listener| {
            let app = setup_admin_router(self.admin());
            let mut admin_shutdown = stop_tx.subscribe();
            tokio::spawn(async move {
                if let Ok(admin_addr) = admin_listener.local_addr() {
                    tracing::info!(address = %admin_addr, "Admin server starting");
                }
                let result = axum::serve(admin_listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Admin server failed");
                }
            })
        });

        let mut shutdown = shutdown;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        let _ = stop_tx.send(());
        let _ = monitor_task.await;
        if let Some(task) = admin_task {
            let _ = task.await;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
