//! Wire protocol
//!
//! Commands go out as `{"type": ..., "parameters": "<json text>"}` with no
//! framing; replies are single JSON documents whose end is detected from the
//! content itself.

pub mod command;
pub mod framing;
pub mod response;

pub use command::{Command, Params, PING_COMMAND, PING_REQUEST};
pub use framing::{check_completion, read_response, Completion, ResponseBuffer};
pub use response::{is_pong, Response, Status, PONG_PREFIX, PONG_REPLY};
