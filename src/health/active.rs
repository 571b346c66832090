//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend in the pool
//! - Update backend liveness from the probe result alone

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::probe::HealthProber;
use crate::load_balancer::pool::ServerPool;
use crate::observability::metrics;

/// Background task that keeps `alive` flags in sync with probe results.
pub struct HealthMonitor {
    pool: Arc<ServerPool>,
    prober: HealthProber,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(pool: Arc<ServerPool>, config: HealthCheckConfig) -> Self {
        let prober = HealthProber::new(&config);
        Self::with_prober(pool, prober, config)
    }

    pub fn with_prober(pool: Arc<ServerPool>, prober: HealthProber, config: HealthCheckConfig) -> Self {
        Self {
            pool,
            prober,
            config,
        }
    }

    /// Run probe cycles until shutdown. The first cycle starts immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            timeout = self.config.timeout_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        // A slow cycle pushes the next one back instead of triggering a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every entry present at cycle start. Returns `(live, total)`.
    pub async fn check_all(&self) -> (usize, usize) {
        let backends = self.pool.entries();
        let results = join_all(backends.iter().map(|backend| async move {
            (backend, self.prober.probe(&backend.address).await)
        }))
        .await;

        let mut live = 0;
        for (backend, healthy) in &results {
            if *healthy {
                live += 1;
            }
            match self.pool.set_alive(&backend.address, *healthy) {
                Some(previous) if previous != *healthy => {
                    if *healthy {
                        tracing::info!(address = %backend.address, "Backend is alive");
                    } else {
                        tracing::warn!(address = %backend.address, "Backend is down");
                    }
                }
                Some(_) => {}
                None => {
                    tracing::debug!(address = %backend.address, "Backend removed during health cycle");
                }
            }
            metrics::record_backend_health(&backend.address, *healthy);
        }

        let total = results.len();
        metrics::record_pool_size(live, total);
        tracing::info!(live, total, "Health cycle complete");
        (live, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_addresses(n: usize) -> Vec<String> {
        let listeners: Vec<_> = (0..n)
            .map(|_| std::net::TcpListener::bind("127.0.0.1:0").unwrap())
            .collect();
        listeners
            .iter()
            .map(|l| format!("http://{}", l.local_addr().unwrap()))
            .collect()
    }

    /// Accepts connections and never answers.
    async fn silent_address() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}", addr)
    }

    fn fast_config() -> HealthCheckConfig {
        HealthCheckConfig {
            interval_secs: 1,
            timeout_secs: 1,
            ..HealthCheckConfig::default()
        }
    }

    #[tokio::test]
    async fn test_cycle_marks_unreachable_dead() {
        let pool = Arc::new(ServerPool::new());
        for address in closed_addresses(2) {
            pool.insert(&address, 1, true).unwrap();
        }

        let monitor = HealthMonitor::new(pool.clone(), fast_config());
        assert_eq!(monitor.check_all().await, (0, 2));
        assert!(pool.entries().iter().all(|e| !e.alive));
        assert_eq!(pool.select(), None);
    }

    #[tokio::test]
    async fn test_unanswered_probe_marks_dead() {
        let pool = Arc::new(ServerPool::new());
        pool.insert(&silent_address().await, 1, true).unwrap();

        let monitor = HealthMonitor::new(pool.clone(), fast_config());
        let cycle = time::timeout(Duration::from_secs(5), monitor.check_all())
            .await
            .expect("probe ignored its timeout");

        assert_eq!(cycle, (0, 1));
        assert!(!pool.entries()[0].alive);
    }

    #[tokio::test]
    async fn test_empty_pool_cycle() {
        let monitor = HealthMonitor::new(Arc::new(ServerPool::new()), fast_config());
        assert_eq!(monitor.check_all().await, (0, 0));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (tx, rx) = broadcast::channel(1);
        let monitor = HealthMonitor::new(Arc::new(ServerPool::new()), fast_config());
        let task = tokio::spawn(monitor.run(rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }
}
