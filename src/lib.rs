//! Editor Bridge
//!
//! A resilient client for the editor's unframed JSON-over-TCP command
//! protocol: boundary detection on the reply stream, liveness checks, and a
//! single verified connection that is rebuilt after failures.

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod util;

pub use config::Config;
pub use connection::{Connection, ConnectionManager, ConnectionReport};
pub use error::{BridgeError, Result};
pub use protocol::Params;

/// Crate version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
