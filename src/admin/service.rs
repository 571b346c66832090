//! Pool administration.
//!
//! Validation happens before any state change, so every operation either
//! applies fully or leaves the pool untouched.

use std::sync::Arc;

use crate::health::HealthProber;
use crate::load_balancer::backend::{parse_address, BackendEntry};
use crate::load_balancer::pool::{PoolError, PoolSnapshot, ServerPool};

#[derive(Clone)]
pub struct PoolAdmin {
    pool: Arc<ServerPool>,
    prober: HealthProber,
}

impl PoolAdmin {
    pub fn new(pool: Arc<ServerPool>, prober: HealthProber) -> Self {
        Self { pool, prober }
    }

    /// Add a backend, seeding `alive` with one synchronous probe.
    pub async fn add(&self, address: &str, weight: u32) -> Result<BackendEntry, PoolError> {
        if weight == 0 {
            return Err(PoolError::InvalidWeight);
        }
        let address = parse_address(address)?;
        // Reject early to skip the probe; `insert` re-checks under the lock.
        if self.pool.contains(&address) {
            return Err(PoolError::DuplicateBackend(address));
        }

        let alive = self.prober.probe(&address).await;
        let entry = self.pool.insert(&address, weight, alive)?;
        tracing::info!(address = %entry.address, alive = entry.alive, "Backend added");
        Ok(entry)
    }

    /// Add `http://{host}:{port}`. An empty host means `localhost`.
    pub async fn add_host_port(&self, host: &str, port: &str) -> Result<BackendEntry, PoolError> {
        let port = port.trim();
        if port.is_empty() {
            return Err(PoolError::MissingPort);
        }
        let host = match host.trim() {
            "" => "localhost",
            h => h,
        };
        self.add(&format!("http://{}:{}", host, port), 1).await
    }

    pub fn remove(&self, index: usize) -> Result<BackendEntry, PoolError> {
        let removed = self.pool.remove_at(index)?;
        tracing::info!(index, address = %removed.address, "Backend removed");
        Ok(removed)
    }

    /// Remove by an index given as text, as submitted by a form.
    pub fn remove_raw(&self, index: &str) -> Result<BackendEntry, PoolError> {
        let parsed = index.trim().parse::<usize>().map_err(|_| PoolError::InvalidIndex {
            index: index.to_string(),
            len: self.pool.len(),
        })?;
        self.remove(parsed)
    }

    pub fn list(&self) -> PoolSnapshot {
        self.pool.snapshot()
    }

    pub fn pool(&self) -> &Arc<ServerPool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HealthCheckConfig;

    fn admin() -> PoolAdmin {
        let config = HealthCheckConfig {
            timeout_secs: 1,
            ..HealthCheckConfig::default()
        };
        PoolAdmin::new(Arc::new(ServerPool::new()), HealthProber::new(&config))
    }

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_add_unreachable_seeds_dead() {
        let admin = admin();
        let port = closed_port();

        let entry = admin.add_host_port("127.0.0.1", &port.to_string()).await.unwrap();
        assert_eq!(entry.address, format!("http://127.0.0.1:{}", port));
        assert!(!entry.alive);
        assert_eq!(admin.list().total, 1);
        assert_eq!(admin.list().live, 0);
    }

    #[tokio::test]
    async fn test_add_rejects_before_mutation() {
        let admin = admin();
        let port = closed_port();
        let address = format!("http://127.0.0.1:{}", port);
        admin.add(&address, 1).await.unwrap();

        assert_eq!(
            admin.add(&address, 1).await,
            Err(PoolError::DuplicateBackend(address.clone()))
        );
        assert!(matches!(admin.add("ftp://x", 1).await, Err(PoolError::InvalidAddress { .. })));
        assert_eq!(admin.add(&address, 0).await, Err(PoolError::InvalidWeight));
        assert_eq!(admin.add_host_port("", " ").await, Err(PoolError::MissingPort));
        assert_eq!(admin.list().total, 1);
    }

    #[tokio::test]
    async fn test_empty_host_defaults_to_localhost() {
        let admin = admin();
        let port = closed_port();
        let entry = admin.add_host_port("  ", &port.to_string()).await.unwrap();
        assert_eq!(entry.address, format!("http://localhost:{}", port));
    }

    #[test]
    fn test_remove_raw() {
        let admin = admin();
        admin.pool().insert("http://h:1", 1, true).unwrap();
        admin.pool().insert("http://h:2", 1, true).unwrap();

        assert_eq!(
            admin.remove_raw("abc"),
            Err(PoolError::InvalidIndex { index: "abc".to_string(), len: 2 })
        );
        assert_eq!(
            admin.remove_raw("-1"),
            Err(PoolError::InvalidIndex { index: "-1".to_string(), len: 2 })
        );
        assert_eq!(admin.remove_raw(" 1 ").unwrap().address, "http://h:2");
        assert!(matches!(admin.remove(1), Err(PoolError::InvalidIndex { .. })));
        assert_eq!(admin.list().total, 1);
    }
}
