//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0, weights > 0)
//! - Keep the upstream timeout within the inbound request timeout
//! - Check backend addresses are well-formed and unique
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::backend::parse_address;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    BindAddress { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("health_check.path must start with '/', got {0:?}")]
    ProbePath(String),
    #[error("timeouts.upstream_secs ({upstream}) must not exceed timeouts.request_secs ({request})")]
    UpstreamExceedsRequest { upstream: u64, request: u64 },
    #[error("backends[{index}]: {reason}")]
    Backend { index: usize, reason: String },
    #[error("backends[{index}]: duplicate address {address}")]
    DuplicateBackend { index: usize, address: String },
}

pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_bind(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.admin.enabled {
        check_bind(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }
    if config.observability.metrics_enabled {
        check_bind(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let hc = &config.health_check;
    if hc.interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "health_check.interval_secs" });
    }
    if hc.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "health_check.timeout_secs" });
    }
    if !hc.path.starts_with('/') {
        errors.push(ValidationError::ProbePath(hc.path.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.upstream_secs" });
    }
    if config.timeouts.upstream_secs > config.timeouts.request_secs {
        errors.push(ValidationError::UpstreamExceedsRequest {
            upstream: config.timeouts.upstream_secs,
            request: config.timeouts.request_secs,
        });
    }

    let mut seen = HashSet::new();
    for (index, backend) in config.backends.iter().enumerate() {
        if backend.weight == 0 {
            errors.push(ValidationError::Backend {
                index,
                reason: "weight must be greater than zero".to_string(),
            });
        }
        match parse_address(&backend.address) {
            Ok(address) => {
                if !seen.insert(address.clone()) {
                    errors.push(ValidationError::DuplicateBackend { index, address });
                }
            }
            Err(e) => errors.push(ValidationError::Backend {
                index,
                reason: e.to_string(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_bind(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress {
            field,
            value: value.to_string(),
        });
    }
}
