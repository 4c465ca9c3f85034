//! MCP (Model Context Protocol) client
//!
//! A small, auditable MCP client built on Tokio and Serde, sized for driving
//! one local stdio tool server.
//!
//! # Architecture
//!
//! 1. **Protocol** (`protocol`): JSON-RPC 2.0 message types
//! 2. **Transport** (`transport`): stdio child-process transport
//! 3. **Client** (`client`): handshake, tool listing, tool calls, timeouts
//! 4. **Server handle** (`server`): launch parameters + session settings,
//!    connected on demand
//!
//! Tool access is narrowed by a [`ToolFilter`] at the client level.

pub mod protocol;

pub mod transport;

pub mod client;

pub mod error;

pub mod filter;

pub mod server;

pub use protocol::{
    ClientCapabilities, ClientInfo, InitializeParams, McpError, McpMethod, McpNotification,
    McpRequest, McpResponse, ServerCapabilities, ServerInfo, Tool, ToolCallParams,
};

pub use transport::{StdioTransport, Transport};

pub use client::{ClientState, McpClient};

pub use error::ClientError;
pub use filter::ToolFilter;
pub use server::{Environment, McpServerStdio, StdioServerParams};
