//! Backend pool management.
//!
//! # Responsibilities
//! - Own the ordered list of backends and the round-robin cursor
//! - Apply the load balancing algorithm to select a backend
//! - Apply admin mutations and health updates atomically

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::BackendConfig;
use crate::load_balancer::{
    backend::{parse_address, BackendEntry},
    round_robin::RoundRobin,
    LoadBalancer,
};

/// Errors reported by pool mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("backend {0} already exists in the pool")]
    DuplicateBackend(String),
    #[error("invalid backend index {index:?} (pool has {len} entries)")]
    InvalidIndex { index: String, len: usize },
    #[error("invalid backend address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("port is required")]
    MissingPort,
    #[error("weight must be greater than zero")]
    InvalidWeight,
}

/// Point-in-time view of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub index: usize,
    pub address: String,
    pub weight: u32,
    pub alive: bool,
}

/// Point-in-time view of the whole pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub backends: Vec<BackendStatus>,
    pub cursor: usize,
    pub live: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    entries: Vec<BackendEntry>,
    cursor: usize,
}

/// The shared, mutable set of backends.
///
/// Entries and cursor live behind a single mutex. Every method takes the lock
/// only for the in-memory operation, so callers never hold it across I/O.
#[derive(Debug)]
pub struct ServerPool {
    state: Mutex<PoolState>,
    balancer: Box<dyn LoadBalancer>,
}

impl Default for ServerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerPool {
    /// Create an empty round-robin pool.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            balancer: Box::new(RoundRobin::new()),
        }
    }

    /// Build a pool from the static configuration.
    ///
    /// Static entries start alive; the first health cycle corrects them.
    /// Invalid or duplicate entries are skipped with a warning.
    pub fn from_config(configs: &[BackendConfig]) -> Self {
        let pool = Self::new();
        for config in configs {
            if let Err(e) = pool.insert(&config.address, config.weight, true) {
                tracing::warn!(address = %config.address, error = %e, "Skipping configured backend");
            }
        }
        pool
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // No method panics while holding the lock, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a backend. Fails if the (normalized) address is already present.
    pub fn insert(&self, address: &str, weight: u32, alive: bool) -> Result<BackendEntry, PoolError> {
        let address = parse_address(address)?;
        let mut state = self.lock();
        if state.entries.iter().any(|e| e.address == address) {
            return Err(PoolError::DuplicateBackend(address));
        }
        let entry = BackendEntry::new(address, weight, alive);
        state.entries.push(entry.clone());
        Ok(entry)
    }

    /// Remove the entry at `index`, re-wrapping the cursor if it fell off the end.
    pub fn remove_at(&self, index: usize) -> Result<BackendEntry, PoolError> {
        let mut state = self.lock();
        let len = state.entries.len();
        if index >= len {
            return Err(PoolError::InvalidIndex {
                index: index.to_string(),
                len,
            });
        }

        let removed = state.entries.remove(index);
        let len = state.entries.len();
        if len == 0 {
            state.cursor = 0;
        } else if state.cursor >= len {
            state.cursor %= len;
        }
        Ok(removed)
    }

    /// Record a probe outcome. Returns the previous state, or `None` if the
    /// backend has been removed since the probe started.
    pub fn set_alive(&self, address: &str, alive: bool) -> Option<bool> {
        let mut state = self.lock();
        state
            .entries
            .iter_mut()
            .find(|e| e.address == address)
            .map(|e| std::mem::replace(&mut e.alive, alive))
    }

    /// Pick the next live backend, or `None` if there is none.
    pub fn select(&self) -> Option<BackendEntry> {
        let mut state = self.lock();
        let PoolState { entries, cursor } = &mut *state;
        self.balancer
            .next_index(entries, cursor)
            .map(|index| entries[index].clone())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.lock().entries.iter().any(|e| e.address == address)
    }

    /// Copy of the current entries, in pool order.
    pub fn entries(&self) -> Vec<BackendEntry> {
        self.lock().entries.clone()
    }

    pub fn cursor(&self) -> usize {
        self.lock().cursor
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.lock();
        let backends: Vec<BackendStatus> = state
            .entries
            .iter()
            .enumerate()
            .map(|(index, e)| BackendStatus {
                index,
                address: e.address.clone(),
                weight: e.weight,
                alive: e.alive,
            })
            .collect();
        PoolSnapshot {
            live: backends.iter().filter(|b| b.alive).count(),
            total: backends.len(),
            cursor: state.cursor,
            backends,
        }
    }
}
