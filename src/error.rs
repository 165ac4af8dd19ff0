//! Error types
//!
//! Every failure an exchange can produce maps onto one of these variants.
//! Callers decide retry policy; the bridge never retries on its own.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the connection manager and protocol client
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No transport could be opened or verified
    #[error("could not reach editor at {endpoint}: {reason}")]
    ConnectionUnavailable { endpoint: String, reason: String },

    /// A single read exceeded the configured deadline
    #[error("timed out after {0:?} waiting for editor response")]
    Timeout(Duration),

    /// Terminal bytes were not a JSON object carrying a status
    #[error("malformed response from editor: {0}")]
    MalformedResponse(String),

    /// The editor answered with `status: "error"`
    #[error("editor error: {0}")]
    Remote(String),

    /// Any other transport or codec failure during an exchange
    #[error("failed to communicate with editor: {0}")]
    Communication(String),
}

impl BridgeError {
    pub(crate) fn unavailable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionUnavailable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Stable label used in log fields and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionUnavailable { .. } => "connection_unavailable",
            Self::Timeout(_) => "timeout",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Remote(_) => "remote_error",
            Self::Communication(_) => "communication_failure",
        }
    }

    /// Whether the connection that produced this error lost its handle.
    ///
    /// A remote error means the editor is alive and merely rejected the
    /// request, so the connection stays usable.
    pub fn invalidates_connection(&self) -> bool {
        !matches!(self, Self::Remote(_))
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Communication(err.to_string())
    }
}

/// Result alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
