//! Client-side failures callers may want to match on
//!
//! Everything else (spawn failures, I/O, malformed JSON, server error
//! responses) travels as `anyhow::Error` with context attached.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The tool filter rejected the call; nothing was sent to the server
    #[error("Tool '{0}' is not permitted by the tool filter")]
    ToolNotAllowed(String),

    /// No response arrived within the session timeout
    #[error("MCP request '{method}' timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("MCP server '{0}' is not connected. Call connect() first.")]
    NotConnected(String),

    #[error("MCP server '{0}' is already connected")]
    AlreadyConnected(String),
}
