//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (lock entries + cursor)
//!     → LoadBalancer algorithm:
//!         - round_robin.rs (rotate, skipping dead entries)
//!     → backend.rs (clone of the chosen entry, lock released)
//!     → Forwarder or "no backend available"
//! ```
//!
//! # Design Decisions
//! - Algorithms are stateless; the pool owns the cursor
//! - One mutex guards entries and cursor together, never held across I/O
//! - Dead backends keep their position and rejoin rotation when alive again

pub mod backend;
pub mod pool;
pub mod round_robin;

use std::fmt::Debug;

use crate::load_balancer::backend::BackendEntry;

/// Selection algorithm run by the pool under its lock.
pub trait LoadBalancer: Debug + Send + Sync {
    /// Return the index of the next eligible entry, advancing `cursor` as
    /// the algorithm requires. `cursor` is a valid index when `entries` is
    /// non-empty.
    fn next_index(&self, entries: &[BackendEntry], cursor: &mut usize) -> Option<usize>;
}
