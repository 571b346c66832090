//! rr-balancer
//!
//! A health-aware, round-robin HTTP load balancer built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 RR-BALANCER                  │
//!  Client Request     │  ┌──────────┐   ┌───────────┐   ┌──────────┐ │
//!  ───────────────────┼─▶│   http   │──▶│ ServerPool│──▶│ forwarder│─┼──▶ Backend
//!                     │  │  server  │   │round-robin│   │ (1 shot) │ │
//!  Client Response    │  └──────────┘   └─────▲─────┘   └──────────┘ │
//!  ◀──────────────────┼── 2xx..5xx / 502 / 503 │                      │
//!                     │                        │ alive flags          │
//!                     │  ┌──────────┐   ┌──────┴─────┐               │
//!  Admin UI / CLI ────┼─▶│  admin   │   │   health   │── GET /health ┼──▶ Backend
//!                     │  │ add/rm   │   │  monitor   │               │
//!                     │  └──────────┘   └────────────┘               │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use rr_balancer::config::{load_config, BalancerConfig};
use rr_balancer::lifecycle::startup;
use rr_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "rr-balancer")]
#[command(about = "Health-aware round-robin HTTP load balancer", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Without it, a local two-backend pool is used.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::with_local_pool(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("rr-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        admin_enabled = config.admin.enabled,
        admin_address = %config.admin.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
