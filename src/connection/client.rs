//! Editor connection and request/response exchange
//!
//! A [`Connection`] either holds exactly one open TCP stream or none. Any
//! failure during an exchange closes and clears the stream; the connection is
//! never reconnected implicitly, the owner must call [`Connection::connect`]
//! again (the [`ConnectionManager`](super::ConnectionManager) does this by
//! replacing the whole connection).

use bytes::Bytes;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use super::state::{ConnectionId, ConnectionInfo, ConnectionState};
use crate::config::EditorConfig;
use crate::error::{BridgeError, Result};
use crate::metrics::METRICS;
use crate::protocol::{is_pong, read_response, Command, Params, Response, PING_REQUEST};
use crate::util::tune_stream;

/// A single transport to the editor
#[derive(Debug)]
pub struct Connection {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
    read_timeout: Duration,
    buffer_size: usize,
    state: ConnectionState,
}

impl Connection {
    /// Create a disconnected connection for the configured endpoint
    pub fn new(id: ConnectionId, config: &EditorConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            stream: None,
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
            buffer_size: config.buffer_size,
            state: ConnectionState::new(id),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.state.id
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn info(&self) -> ConnectionInfo {
        self.state.to_info(&self.endpoint())
    }

    /// Open the TCP stream. No-op when already connected.
    pub async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let endpoint = self.endpoint();
        let connecting = TcpStream::connect((self.host.as_str(), self.port));

        let stream = match tokio::time::timeout(self.connect_timeout, connecting).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                METRICS.connection_failed();
                error!(endpoint = %endpoint, error = %e, "Failed to connect to editor");
                return Err(BridgeError::unavailable(endpoint, e.to_string()));
            }
            Err(_) => {
                METRICS.connection_failed();
                error!(endpoint = %endpoint, "Timed out connecting to editor");
                return Err(BridgeError::unavailable(
                    endpoint,
                    format!("connect timed out after {:?}", self.connect_timeout),
                ));
            }
        };

        if let Err(e) = tune_stream(&stream) {
            debug!(error = %e, "Failed to tune editor socket");
        }

        self.stream = Some(stream);
        self.state.set_connected();
        METRICS.connection_opened();
        info!(conn_id = %self.state.id, endpoint = %endpoint, "Connected to editor");

        Ok(())
    }

    /// Close and clear the stream. Close errors are logged, never returned.
    pub async fn disconnect(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };

        if let Err(e) = stream.shutdown().await {
            warn!(conn_id = %self.state.id, error = %e, "Error disconnecting from editor");
        }

        self.state.set_disconnected();
        METRICS.connection_closed();
        info!(conn_id = %self.state.id, "Disconnected from editor");
    }

    /// Send a command and return its result payload.
    ///
    /// `ping` is routed to the liveness check and yields `{"message": "pong"}`.
    pub async fn send_command(&mut self, command_type: &str, params: Params) -> Result<Value> {
        let command = Command::new(command_type, params);
        if command.is_ping() {
            self.ping().await?;
            return Ok(json!({ "message": "pong" }));
        }
        self.exchange(&command).await
    }

    /// Liveness check. Any failure clears the stream.
    pub async fn ping(&mut self) -> Result<()> {
        METRICS.ping();
        debug!(conn_id = %self.state.id, "Sending ping to verify connection");

        let outcome = self.verify().await;
        if let Err(ref e) = outcome {
            METRICS.ping_failed();
            if matches!(e, BridgeError::Timeout(_)) {
                METRICS.timeout();
            }
            warn!(conn_id = %self.state.id, error = %e, "Ping failed");
            self.invalidate().await;
        }
        outcome
    }

    async fn verify(&mut self) -> Result<()> {
        let reply = self.round_trip(PING_REQUEST).await?;
        if is_pong(&reply) {
            return Ok(());
        }

        let response = Response::decode(&reply)?;
        if response.is_success() {
            return Ok(());
        }

        let detail = response
            .error
            .unwrap_or_else(|| format!("status {:?}", response.status));
        Err(BridgeError::Communication(format!(
            "connection verification failed: {detail}"
        )))
    }

    async fn exchange(&mut self, command: &Command) -> Result<Value> {
        METRICS.exchange();
        info!(conn_id = %self.state.id, command = command.command_type(), "Sending command");

        let outcome = match command.encode() {
            Ok(request) => self.round_trip(&request).await,
            Err(e) => Err(e),
        };
        let outcome = outcome
            .and_then(|reply| Response::decode(&reply))
            .and_then(Response::into_result);

        match outcome {
            Ok(result) => Ok(result),
            Err(BridgeError::Remote(message)) => {
                METRICS.remote_error();
                error!(command = command.command_type(), error = %message, "Editor reported error");
                Err(BridgeError::Remote(message))
            }
            Err(e) => {
                METRICS.exchange_failed();
                if matches!(e, BridgeError::Timeout(_)) {
                    METRICS.timeout();
                }
                error!(
                    conn_id = %self.state.id,
                    command = command.command_type(),
                    error = %e,
                    "Communication error with editor"
                );
                self.invalidate().await;
                Err(e)
            }
        }
    }

    /// One write followed by one boundary-detected read
    async fn round_trip(&mut self, request: &[u8]) -> Result<Bytes> {
        let endpoint = self.endpoint();
        let Some(stream) = self.stream.as_mut() else {
            return Err(BridgeError::unavailable(endpoint, "not connected"));
        };

        self.state.begin_send();
        stream.write_all(request).await?;
        stream.flush().await?;
        self.state.begin_await(request.len() as u64);
        METRICS.bytes_tx(request.len() as u64);

        let reply = read_response(stream, self.buffer_size, self.read_timeout).await?;

        self.state.complete(reply.len() as u64);
        METRICS.bytes_rx(reply.len() as u64);
        Ok(reply)
    }

    async fn invalidate(&mut self) {
        self.state.fail();
        self.disconnect().await;
    }
}
