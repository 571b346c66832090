//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Metrics, then listeners, then the server and its background tasks
//! - Shutdown waits for the server to drain

use std::error::Error;

use tokio::net::TcpListener;

use crate::config::BalancerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Run the balancer until a shutdown signal arrives.
pub async fn run(config: BalancerConfig) -> Result<(), Box<dyn Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let admin_listener = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    let server = HttpServer::new(config);
    for (index, backend) in server.pool().entries().iter().enumerate() {
        tracing::info!(index, address = %backend.address, "Initial backend");
    }

    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, admin_listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = signals::wait_for_signal() => {}
    }

    shutdown.trigger();
    server_task.await??;
    Ok(())
}
