//! Connection manager
//!
//! Owns the single editor connection: creates it lazily, verifies it with a
//! ping on every acquire, and replaces it when verification fails. Access is
//! serialized through a mutex; a [`ConnectionLease`] holds the lock for as long
//! as the caller uses the connection.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use super::client::Connection;
use super::state::{ConnectionId, ConnectionInfo};
use crate::config::EditorConfig;
use crate::error::{BridgeError, Result};
use crate::metrics::METRICS;
use crate::protocol::{Params, PING_COMMAND};

/// Single-connection pool for the editor
pub struct ConnectionManager {
    /// Endpoint and transport settings for new connections
    config: EditorConfig,
    /// The shared connection slot
    slot: Arc<Mutex<Option<Connection>>>,
    /// ID generator
    next_id: AtomicU64,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new(config: EditorConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> String {
        self.config.endpoint()
    }

    /// Hand out a verified connection, creating or replacing it as needed.
    ///
    /// Never retries beyond one create-and-verify attempt. On failure the
    /// slot is left empty so the next call starts from scratch.
    pub async fn acquire(&self) -> Result<ConnectionLease> {
        let mut slot = self.slot.clone().lock_owned().await;

        if let Some(mut existing) = slot.take() {
            if existing.is_connected() {
                match existing.ping().await {
                    Ok(()) => {
                        debug!(conn_id = %existing.id(), "Reusing existing editor connection");
                        *slot = Some(existing);
                        return Ok(ConnectionLease { guard: slot });
                    }
                    Err(e) => {
                        warn!(conn_id = %existing.id(), error = %e, "Existing connection failed");
                    }
                }
            } else {
                debug!(conn_id = %existing.id(), "Discarding disconnected editor connection");
            }
            existing.disconnect().await;
        }

        let endpoint = self.endpoint();
        info!(endpoint = %endpoint, "Creating new editor connection");

        let id = ConnectionId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut conn = Connection::new(id, &self.config);
        conn.connect().await?;

        if let Err(e) = conn.ping().await {
            error!(conn_id = %id, error = %e, "Could not verify new connection");
            conn.disconnect().await;
            METRICS.connection_failed();
            return Err(BridgeError::unavailable(
                endpoint,
                format!("could not verify new connection: {e}"),
            ));
        }

        info!(conn_id = %id, "Successfully established new editor connection");
        *slot = Some(conn);
        Ok(ConnectionLease { guard: slot })
    }

    /// Acquire a connection and run one exchange on it
    pub async fn exchange(&self, command_type: &str, params: Params) -> Result<Value> {
        let mut lease = self.acquire().await?;
        lease.send_command(command_type, params).await
    }

    /// Ping through the normal exchange path and report the outcome
    pub async fn test_connection(&self) -> ConnectionReport {
        match self.exchange(PING_COMMAND, Params::new()).await {
            Ok(data) => ConnectionReport {
                success: true,
                message: "Editor connection test successful".to_string(),
                data: Some(data),
            },
            Err(e) => {
                error!(error = %e, "Editor connection test failed");
                ConnectionReport {
                    success: false,
                    message: format!("Editor connection test failed: {e}"),
                    data: None,
                }
            }
        }
    }

    /// Best-effort connect at startup. Returns whether a connection is held.
    pub async fn startup(&self) -> bool {
        info!(endpoint = %self.endpoint(), "Editor bridge starting up");
        match self.acquire().await {
            Ok(_) => {
                info!("Connected to editor on startup");
                true
            }
            Err(e) => {
                warn!(error = %e, "Could not connect to editor on startup");
                false
            }
        }
    }

    /// Close the held connection, if any, and empty the slot
    pub async fn release(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(mut conn) = slot.take() {
            conn.disconnect().await;
        }
    }

    pub async fn shutdown(&self) {
        self.release().await;
        info!("Editor bridge shut down");
    }

    /// Snapshot of the held connection
    pub async fn status(&self) -> Option<ConnectionInfo> {
        self.slot.lock().await.as_ref().map(Connection::info)
    }

    /// Whether the slot currently holds a connection
    pub async fn has_connection(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

/// Exclusive access to the manager's connection
pub struct ConnectionLease {
    guard: OwnedMutexGuard<Option<Connection>>,
}

impl ConnectionLease {
    fn connection(&mut self) -> Result<&mut Connection> {
        self.guard
            .as_mut()
            .ok_or_else(|| BridgeError::unavailable("editor", "connection was released"))
    }

    pub async fn send_command(&mut self, command_type: &str, params: Params) -> Result<Value> {
        self.connection()?.send_command(command_type, params).await
    }

    pub async fn ping(&mut self) -> Result<()> {
        self.connection()?.ping().await
    }

    pub fn is_connected(&self) -> bool {
        self.guard.as_ref().map_or(false, Connection::is_connected)
    }

    pub fn info(&self) -> Option<ConnectionInfo> {
        self.guard.as_ref().map(Connection::info)
    }

    /// Close the connection and empty the manager's slot
    pub async fn release(mut self) {
        if let Some(mut conn) = self.guard.take() {
            conn.disconnect().await;
        }
    }
}

/// Outcome of [`ConnectionManager::test_connection`]
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
