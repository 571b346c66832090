//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → static backends seed the ServerPool at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the pool is changed through the admin surface
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, BackendConfig, BalancerConfig, HealthCheckConfig, ListenerConfig,
    ObservabilityConfig, TimeoutConfig,
};
