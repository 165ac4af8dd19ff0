//! Reply decoding
//!
//! Reply format: `{"status": "success"|"error", "result": <any>, "error"?: <string>, "message"?: <string>}`

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BridgeError, Result};

/// Leading bytes of the editor's fixed liveness reply
pub const PONG_PREFIX: &str = r#"{"status":"success","result":{"message":"pong""#;

/// The editor's complete liveness reply
pub const PONG_REPLY: &str = r#"{"status":"success","result":{"message":"pong"}}"#;

/// Fallback when an error reply carries no message
pub const UNKNOWN_ERROR: &str = "Unknown editor error";

/// Reply status discriminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    /// Any other status string. Treated as success.
    Other(String),
}

impl Status {
    fn parse(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A decoded editor reply
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    /// Result payload, `{}` when the reply has none
    pub result: Value,
    /// Error text for `status: "error"` replies
    pub error: Option<String>,
}

impl Response {
    /// Decode the complete reply bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| BridgeError::MalformedResponse(e.to_string()))?;

        let Value::Object(mut body) = value else {
            return Err(BridgeError::MalformedResponse(
                "response is not a JSON object".to_string(),
            ));
        };

        let status = match body.get("status") {
            Some(Value::String(raw)) => Status::parse(raw),
            Some(_) => {
                return Err(BridgeError::MalformedResponse(
                    "response status is not a string".to_string(),
                ))
            }
            None => {
                return Err(BridgeError::MalformedResponse(
                    "response has no status field".to_string(),
                ))
            }
        };

        let error = match status {
            Status::Error => Some(error_message(&body)),
            _ => None,
        };

        let result = body
            .remove("result")
            .unwrap_or_else(|| Value::Object(Map::new()));

        Ok(Self {
            status,
            result,
            error,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Turn the reply into the caller-facing result
    pub fn into_result(self) -> Result<Value> {
        match self.status {
            Status::Error => Err(BridgeError::Remote(
                self.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            )),
            Status::Success => Ok(self.result),
            Status::Other(status) => {
                debug!(%status, "Unrecognized response status, treating as success");
                Ok(self.result)
            }
        }
    }
}

/// `error`, then `message`, then a fixed fallback
fn error_message(body: &Map<String, Value>) -> String {
    ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

/// Whether the bytes so far start with the fixed liveness reply
pub fn is_pong(bytes: &[u8]) -> bool {
    skip_leading_whitespace(bytes).starts_with(PONG_PREFIX.as_bytes())
}

pub(crate) fn skip_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
