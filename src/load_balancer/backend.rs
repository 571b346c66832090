//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server in the pool
//! - Normalize and validate backend addresses
//! - Track liveness as last reported by the health monitor

use serde::Serialize;
use url::Url;

use crate::load_balancer::pool::PoolError;

/// A single backend server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendEntry {
    /// Canonical base address, `http://host:port`.
    pub address: String,
    /// Reserved for weighted scheduling; round-robin ignores it.
    pub weight: u32,
    /// Outcome of the most recent health probe.
    pub alive: bool,
}

impl BackendEntry {
    pub fn new(address: String, weight: u32, alive: bool) -> Self {
        Self {
            address,
            weight,
            alive,
        }
    }

    /// Absolute URL for `path_and_query` on this backend.
    pub fn url_for(&self, path_and_query: &str) -> String {
        if path_and_query.starts_with('/') {
            format!("{}{}", self.address, path_and_query)
        } else {
            format!("{}/{}", self.address, path_and_query)
        }
    }
}

/// Parse a raw backend address into its canonical `http://host:port` form.
///
/// Only plain `http` base addresses are accepted: no path, query, fragment
/// or credentials. A missing port defaults to 80.
pub fn parse_address(raw: &str) -> Result<String, PoolError> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid(raw, e.to_string()))?;

    if url.scheme() != "http" {
        return Err(invalid(raw, format!("unsupported scheme {:?}", url.scheme())));
    }
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid(raw, "missing host"))?;
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid(raw, "credentials are not allowed"));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(raw, "path, query and fragment are not allowed"));
    }

    let port = url.port_or_known_default().unwrap_or(80);
    Ok(format!("http://{}:{}", host, port))
}

fn invalid(raw: &str, reason: impl Into<String>) -> PoolError {
    PoolError::InvalidAddress {
        address: raw.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_normalizes() {
        assert_eq!(parse_address("http://h:1").unwrap(), "http://h:1");
        assert_eq!(parse_address(" http://Example.com/ ").unwrap(), "http://example.com:80");
        assert_eq!(parse_address("http://[::1]:5001").unwrap(), "http://[::1]:5001");
    }

    #[test]
    fn test_parse_address_rejects() {
        for raw in [
            "",
            "localhost:5001",
            "https://h:443",
            "http://h:1/api",
            "http://h:1?x=1",
            "http://user:pw@h:1",
            "http://h:99999",
        ] {
            assert!(
                matches!(parse_address(raw), Err(PoolError::InvalidAddress { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_url_for() {
        let entry = BackendEntry::new("http://h:1".to_string(), 1, true);
        assert_eq!(entry.url_for("/process?a=1"), "http://h:1/process?a=1");
        assert_eq!(entry.url_for("x"), "http://h:1/x");
    }
}
