//! Outbound commands
//!
//! The editor's decoder expects `parameters` as a JSON *string*, so the
//! parameter object is serialized first and then embedded as a string value:
//!
//! ```text
//! {"type":"manage_scene","parameters":"{\"action\":\"load\",\"name\":\"Main\"}"}
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

/// Reserved command type for the liveness check
pub const PING_COMMAND: &str = "ping";

/// Literal bytes sent for a liveness check (no JSON envelope)
pub const PING_REQUEST: &[u8] = b"ping";

/// Command parameters
///
/// Keys whose value is absent (`None` via [`Params::set_opt`], or JSON `null`)
/// are never transmitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a parameter
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a parameter only when a value is present
    pub fn set_opt<V: Into<Value>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        let key: String = key.into();
        match value {
            Some(value) => {
                self.0.insert(key, value.into());
            }
            None => {
                self.0.remove(&key);
            }
        }
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The mapping as it goes on the wire, with absent values dropped
    pub fn to_wire(&self) -> Map<String, Value> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Params {
    type Error = BridgeError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(BridgeError::Communication(format!(
                "command parameters must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

/// Wire envelope for non-ping commands
#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    command_type: &'a str,
    parameters: String,
}

/// A request for the editor
#[derive(Debug, Clone)]
pub struct Command {
    command_type: String,
    params: Params,
}

impl Command {
    pub fn new(command_type: impl Into<String>, params: Params) -> Self {
        Self {
            command_type: command_type.into(),
            params,
        }
    }

    pub fn ping() -> Self {
        Self::new(PING_COMMAND, Params::new())
    }

    pub fn command_type(&self) -> &str {
        &self.command_type
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn is_ping(&self) -> bool {
        self.command_type == PING_COMMAND
    }

    /// Encode the request bytes written to the transport
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.is_ping() {
            return Ok(PING_REQUEST.to_vec());
        }

        let parameters = serde_json::to_string(&self.params.to_wire())
            .map_err(|e| BridgeError::Communication(format!("failed to encode parameters: {e}")))?;

        let envelope = Envelope {
            command_type: &self.command_type,
            parameters,
        };

        serde_json::to_vec(&envelope)
            .map_err(|e| BridgeError::Communication(format!("failed to encode command: {e}")))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
