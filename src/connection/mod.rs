//! Editor connection management
//!
//! Connection lifecycle, the request/response exchange, and the
//! single-connection manager.

pub mod client;
pub mod manager;
pub mod state;

pub use client::Connection;
pub use manager::{ConnectionLease, ConnectionManager, ConnectionReport};
pub use state::{ConnectionId, ConnectionInfo, ConnectionPhase, ConnectionState, ExchangePhase};
