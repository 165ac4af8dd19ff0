//! Boundary detection for the unframed reply stream
//!
//! The editor writes exactly one JSON document per request with no length
//! prefix or delimiter. A reply is complete at the first point where the bytes
//! received so far parse as one whole JSON document. Transport chunking may
//! split a UTF-8 sequence or a JSON token anywhere, so every chunk is appended
//! to an accumulator and the whole buffer is re-checked:
//!
//! - `Incomplete`: the document is truncated, keep reading
//! - `Complete`: boundary found
//! - `Malformed`: the bytes do not parse for another reason. Mid-stream this
//!   still means "keep reading"; if the peer then closes, the terminal decode
//!   reports it.

use bytes::{Bytes, BytesMut};
use serde::de::IgnoredAny;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace, warn};

use super::response::{is_pong, skip_leading_whitespace, PONG_REPLY};
use crate::error::{BridgeError, Result};

/// Accumulator capacity cap, independent of the per-read size
const MAX_INITIAL_CAPACITY: usize = 64 * 1024;

/// Buffered size past which a still-incomplete reply is reported
const LARGE_RESPONSE_BYTES: usize = 1024 * 1024;

/// Outcome of checking the buffered bytes for a message boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Incomplete,
    Complete,
    Malformed(String),
}

/// Check whether `buf` holds exactly one complete JSON document.
///
/// Chunking never moves the boundary for object and array documents, which
/// is all the editor sends. A top-level scalar such as `12` is complete as
/// soon as its first digit parses.
pub fn check_completion(buf: &[u8]) -> Completion {
    if let Some(completion) = pong_completion(buf) {
        return completion;
    }

    let text = match std::str::from_utf8(buf) {
        Ok(text) => text,
        // Trailing partial code point
        Err(e) if e.error_len().is_none() => return Completion::Incomplete,
        Err(e) => return Completion::Malformed(e.to_string()),
    };

    let trimmed = text.trim();
    let closer = match trimmed.as_bytes().first() {
        None => return Completion::Incomplete,
        Some(b'{') => Some(b'}'),
        Some(b'[') => Some(b']'),
        Some(_) => None,
    };
    // Containers can only be complete once their closing byte arrived
    if let Some(closer) = closer {
        if trimmed.as_bytes().last() != Some(&closer) {
            return Completion::Incomplete;
        }
    }

    match serde_json::from_str::<IgnoredAny>(text) {
        Ok(_) => Completion::Complete,
        Err(e) if e.is_eof() => Completion::Incomplete,
        Err(e) => Completion::Malformed(e.to_string()),
    }
}

/// Boundary for the fixed liveness reply without a JSON parse.
///
/// Once the pong prefix has arrived, reading continues until the whole
/// literal is buffered so no trailing bytes are left on the stream. `None`
/// means the buffer is not the liveness reply and needs a full parse.
fn pong_completion(buf: &[u8]) -> Option<Completion> {
    if !is_pong(buf) {
        return None;
    }

    let reply = skip_leading_whitespace(buf);
    let literal = PONG_REPLY.as_bytes();
    if reply.starts_with(literal) {
        Some(Completion::Complete)
    } else if literal.starts_with(reply) {
        Some(Completion::Incomplete)
    } else {
        None
    }
}

/// Accumulates reply chunks until a boundary is found
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    buffer: BytesMut,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a chunk and re-check the whole buffer
    pub fn push(&mut self, chunk: &[u8]) -> Completion {
        self.buffer.extend_from_slice(chunk);
        check_completion(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }
}

/// Read one reply from `reader`.
///
/// Each read is bounded by `read_timeout`. A zero-byte read ends the reply:
/// with nothing buffered it is an error, otherwise the buffered bytes are
/// returned as-is.
pub async fn read_response<R>(
    reader: &mut R,
    buffer_size: usize,
    read_timeout: Duration,
) -> Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; buffer_size];
    let mut buffer = ResponseBuffer::with_capacity(buffer_size.min(MAX_INITIAL_CAPACITY));
    let mut reported_large = false;

    loop {
        let n = match tokio::time::timeout(read_timeout, reader.read(&mut chunk)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(
                    buffered = buffer.len(),
                    timeout_ms = read_timeout.as_millis() as u64,
                    "Read timed out waiting for editor response"
                );
                return Err(BridgeError::Timeout(read_timeout));
            }
        };

        if n == 0 {
            if buffer.is_empty() {
                return Err(BridgeError::Communication(
                    "connection closed before receiving data".to_string(),
                ));
            }
            debug!(bytes = buffer.len(), "Peer closed stream, using buffered response");
            return Ok(buffer.freeze());
        }

        match buffer.push(&chunk[..n]) {
            Completion::Complete => {
                debug!(bytes = buffer.len(), "Received complete response");
                return Ok(buffer.freeze());
            }
            Completion::Incomplete => {
                trace!(bytes = buffer.len(), "Response incomplete, reading more");
            }
            Completion::Malformed(reason) => {
                trace!(bytes = buffer.len(), %reason, "Buffered bytes do not parse yet, reading more");
            }
        }

        if !reported_large && buffer.len() >= LARGE_RESPONSE_BYTES {
            reported_large = true;
            debug!(bytes = buffer.len(), "Response still incomplete past 1 MiB");
        }
    }
}
