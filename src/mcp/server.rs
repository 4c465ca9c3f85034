//! Stdio MCP server handle
//!
//! [`McpServerStdio`] bundles everything needed to talk to a local MCP server:
//! how to launch it ([`StdioServerParams`]), how long a request may take, and
//! which tools may be used. Building one is pure; the child process is only
//! spawned by [`McpServerStdio::connect`].

use crate::mcp::client::{ClientState, McpClient};
use crate::mcp::error::ClientError;
use crate::mcp::filter::ToolFilter;
use crate::mcp::protocol::Tool;
use crate::mcp::transport::{StdioTransport, Transport};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::time::Duration;

/// Environment handed to the child process
///
/// `OsString` on both sides so non-UTF-8 variables survive the copy.
pub type Environment = BTreeMap<OsString, OsString>;

/// How to launch a stdio MCP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioServerParams {
    /// Executable to run (resolved through `PATH` in `env`)
    pub command: String,

    pub args: Vec<String>,

    /// Complete environment of the child
    pub env: Environment,
}

impl StdioServerParams {
    /// `command arg1 arg2 ...`, for logs and diagnostics
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A configured, not-yet-started connection to a stdio MCP server
pub struct McpServerStdio {
    name: String,
    params: StdioServerParams,
    client_session_timeout: Duration,
    tool_filter: ToolFilter,
    session: Option<McpClient<StdioTransport>>,
}

impl McpServerStdio {
    pub fn new(
        name: impl Into<String>,
        params: StdioServerParams,
        client_session_timeout: Duration,
        tool_filter: ToolFilter,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            client_session_timeout,
            tool_filter,
            session: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &StdioServerParams {
        &self.params
    }

    pub fn client_session_timeout(&self) -> Duration {
        self.client_session_timeout
    }

    pub fn tool_filter(&self) -> &ToolFilter {
        &self.tool_filter
    }

    /// A session exists, finished its handshake and has not timed out or hit EOF
    pub fn is_connected(&self) -> bool {
        self.session.as_ref().is_some_and(session_usable)
    }

    /// Spawn the server and run the MCP initialize handshake
    ///
    /// A previous session that timed out or lost its server is shut down and
    /// replaced; a live one makes this fail with
    /// [`ClientError::AlreadyConnected`].
    pub async fn connect(&mut self) -> Result<()> {
        match self.session.take() {
            Some(client) if session_usable(&client) => {
                self.session = Some(client);
                return Err(ClientError::AlreadyConnected(self.name.clone()).into());
            }
            Some(mut stale) => {
                tracing::warn!(
                    "Replacing stale session of MCP server '{}' ({:?})",
                    self.name,
                    stale.state()
                );
                if let Err(e) = stale.transport_mut().kill().await {
                    tracing::warn!("Failed to stop stale MCP server '{}': {:#}", self.name, e);
                }
            }
            None => {}
        }

        tracing::info!(
            "Connecting to MCP server '{}': {}",
            self.name,
            self.params.command_line()
        );

        let transport = StdioTransport::spawn(&self.params)
            .await
            .with_context(|| format!("Failed to start MCP server '{}'", self.name))?;

        let mut client = McpClient::new(transport)
            .with_timeout(self.client_session_timeout)
            .with_tool_filter(self.tool_filter.clone());

        client
            .initialize()
            .await
            .with_context(|| format!("Failed to initialize MCP server '{}'", self.name))?;

        self.session = Some(client);
        Ok(())
    }

    /// Tools the server offers that pass the tool filter
    pub async fn list_tools(&mut self) -> Result<Vec<Tool>> {
        self.session_mut()?.list_tools().await
    }

    /// Invoke a tool; filtered names are rejected before anything is sent
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.session_mut()?.call_tool(name, arguments).await
    }

    /// Stop the server process. Safe to call when not connected.
    pub async fn cleanup(&mut self) -> Result<()> {
        if let Some(mut client) = self.session.take() {
            tracing::info!("Shutting down MCP server '{}'", self.name);
            client.transport_mut().kill().await?;
        }
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut McpClient<StdioTransport>> {
        self.session
            .as_mut()
            .ok_or_else(|| ClientError::NotConnected(self.name.clone()).into())
    }
}

fn session_usable(client: &McpClient<StdioTransport>) -> bool {
    client.state() == ClientState::Ready && client.transport().is_connected()
}

impl std::fmt::Debug for McpServerStdio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServerStdio")
            .field("name", &self.name)
            .field("command", &self.params.command_line())
            .field("client_session_timeout", &self.client_session_timeout)
            .field("tool_filter", &self.tool_filter)
            .field("connected", &self.is_connected())
            .finish()
    }
}
