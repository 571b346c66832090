//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → proxy.rs (select backend, forward, relay)
//!     → client.rs (outbound call with timeout)
//!     → Send backend response (or 502/503) to client
//! ```

pub mod client;
pub mod proxy;
pub mod request;
pub mod server;

pub use proxy::{Forwarder, ProxyError};
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
