//! In-process mock editor for integration tests
//!
//! Accepts connections on an ephemeral port, detects each request the same
//! way the real editor does (literal `ping` or one complete JSON envelope),
//! and answers according to a scripted responder.

#![allow(dead_code)]

use editor_bridge::config::EditorConfig;
use editor_bridge::protocol::{check_completion, Completion};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const PONG: &[u8] = br#"{"status":"success","result":{"message":"pong"}}"#;

/// A request as decoded by the mock editor
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Ping,
    Command { command_type: String, params: Value },
}

/// What the mock editor does with a request
#[derive(Debug, Clone)]
pub enum Reply {
    /// Write the bytes in one go
    Send(Vec<u8>),
    /// Write each chunk separately with a short pause in between
    Chunks(Vec<Vec<u8>>),
    /// Write the bytes then close the connection
    SendAndClose(Vec<u8>),
    /// Never answer
    Silence,
    /// Close the connection without answering
    Close,
}

pub type Responder = Arc<dyn Fn(&Request) -> Reply + Send + Sync>;

pub struct MockEditor {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Request>>>,
    pub accepted: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockEditor {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(AtomicUsize::new(0));
        let responder: Responder = Arc::new(responder);

        let task = {
            let requests = requests.clone();
            let accepted = accepted.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(stream, responder.clone(), requests.clone()));
                }
            })
        };

        Self {
            addr,
            requests,
            accepted,
            task,
        }
    }

    /// A well-behaved editor: pongs pings and echoes command params as the result
    pub async fn echo() -> Self {
        Self::start(|request| match request {
            Request::Ping => Reply::Send(PONG.to_vec()),
            Request::Command { params, .. } => Reply::Send(
                serde_json::to_vec(&serde_json::json!({"status": "success", "result": params}))
                    .unwrap(),
            ),
        })
        .await
    }

    pub fn config(&self) -> EditorConfig {
        EditorConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            connect_timeout_ms: 1_000,
            read_timeout_ms: 2_000,
            buffer_size: 16,
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for MockEditor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, responder: Responder, requests: Arc<Mutex<Vec<Request>>>) {
    while let Some(request) = read_request(&mut stream).await {
        requests.lock().unwrap().push(request.clone());

        match responder(&request) {
            Reply::Send(bytes) => {
                if stream.write_all(&bytes).await.is_err() {
                    return;
                }
            }
            Reply::Chunks(chunks) => {
                for chunk in chunks {
                    if stream.write_all(&chunk).await.is_err() {
                        return;
                    }
                    let _ = stream.flush().await;
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
            Reply::SendAndClose(bytes) => {
                let _ = stream.write_all(&bytes).await;
                return;
            }
            Reply::Silence => {}
            Reply::Close => return,
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if buffer == b"ping" {
            return Some(Request::Ping);
        }
        if check_completion(&buffer) == Completion::Complete {
            let envelope: Value = serde_json::from_slice(&buffer).ok()?;
            let command_type = envelope["type"].as_str()?.to_string();
            let params = serde_json::from_str(envelope["parameters"].as_str()?).ok()?;
            return Some(Request::Command {
                command_type,
                params,
            });
        }
    }
}
