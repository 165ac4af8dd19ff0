//! Connection state

use serde::Serialize;
use std::time::Instant;

/// Unique connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Create from raw u64
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get raw value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Whether the connection holds a transport handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    Disconnected,
    Connected,
}

/// Progress of the most recent exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangePhase {
    Idle,
    Sending,
    AwaitingReply,
    Complete,
    Failed,
}

/// Per-connection bookkeeping
#[derive(Debug)]
pub struct ConnectionState {
    /// Unique identifier
    pub id: ConnectionId,
    /// Transport phase
    pub phase: ConnectionPhase,
    /// Most recent exchange phase
    pub exchange: ExchangePhase,
    /// When the current handle was attached
    pub connected_at: Option<Instant>,
    /// Last activity time
    pub last_active: Instant,
    /// Bytes received
    pub bytes_rx: u64,
    /// Bytes sent
    pub bytes_tx: u64,
    /// Completed exchanges, pings included
    pub exchanges: u64,
}

impl ConnectionState {
    /// Create new connection state
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            phase: ConnectionPhase::Disconnected,
            exchange: ExchangePhase::Idle,
            connected_at: None,
            last_active: Instant::now(),
            bytes_rx: 0,
            bytes_tx: 0,
            exchanges: 0,
        }
    }

    /// Mark the handle as attached
    pub fn set_connected(&mut self) {
        self.phase = ConnectionPhase::Connected;
        self.exchange = ExchangePhase::Idle;
        self.connected_at = Some(Instant::now());
        self.touch();
    }

    /// Mark the handle as cleared
    pub fn set_disconnected(&mut self) {
        self.phase = ConnectionPhase::Disconnected;
        self.connected_at = None;
    }

    pub fn begin_send(&mut self) {
        self.exchange = ExchangePhase::Sending;
        self.touch();
    }

    pub fn begin_await(&mut self, sent: u64) {
        self.exchange = ExchangePhase::AwaitingReply;
        self.bytes_tx = self.bytes_tx.saturating_add(sent);
    }

    pub fn complete(&mut self, received: u64) {
        self.exchange = ExchangePhase::Complete;
        self.bytes_rx = self.bytes_rx.saturating_add(received);
        self.exchanges = self.exchanges.saturating_add(1);
        self.touch();
    }

    /// Failed exchanges always leave the connection disconnected
    pub fn fail(&mut self) {
        self.exchange = ExchangePhase::Failed;
        self.set_disconnected();
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Time since the handle was attached
    pub fn uptime(&self) -> std::time::Duration {
        self.connected_at
            .map(|at| at.elapsed())
            .unwrap_or_default()
    }

    /// Get idle duration
    pub fn idle_duration(&self) -> std::time::Duration {
        self.last_active.elapsed()
    }

    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }

    /// Convert to serializable info
    pub fn to_info(&self, endpoint: &str) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id.to_string(),
            endpoint: endpoint.to_string(),
            phase: self.phase,
            last_exchange: self.exchange,
            uptime_secs: self.uptime().as_secs_f64(),
            idle_secs: self.idle_duration().as_secs_f64(),
            bytes_rx: self.bytes_rx,
            bytes_tx: self.bytes_tx,
            exchanges: self.exchanges,
        }
    }
}

/// Serializable connection information for status output
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    /// Connection ID (hex string)
    pub id: String,
    /// Editor host:port
    pub endpoint: String,
    pub phase: ConnectionPhase,
    pub last_exchange: ExchangePhase,
    /// Seconds since connect
    pub uptime_secs: f64,
    /// Idle time in seconds
    pub idle_secs: f64,
    /// Bytes received
    pub bytes_rx: u64,
    /// Bytes sent
    pub bytes_tx: u64,
    pub exchanges: u64,
}
