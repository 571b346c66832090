//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each backend concurrently (probe.rs)
//!     → Update alive flag in the pool
//! ```
//!
//! # Design Decisions
//! - Liveness comes from probes only; proxy failures never change it
//! - Every probe failure mode (timeout, refused, non-2xx) means "not alive"
//! - Cycles never overlap; the next tick waits for the current cycle

pub mod active;
pub mod probe;

pub use active::HealthMonitor;
pub use probe::HealthProber;
