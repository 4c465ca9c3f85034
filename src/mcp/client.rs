//! MCP Client Layer
//!
//! High-level client over any [`Transport`]: the initialize handshake, tool
//! discovery and tool invocation. Every request/response round trip is
//! bounded by the session timeout, and tool names are checked against the
//! [`ToolFilter`] before anything reaches the server.
//!
//! # Usage
//!
//! ```ignore
//! use scanbridge::mcp::{McpClient, StdioTransport, ToolFilter};
//!
//! let transport = StdioTransport::spawn(&params).await?;
//! let mut client = McpClient::new(transport)
//!     .with_timeout(Duration::from_secs(120))
//!     .with_tool_filter(ToolFilter::allow(["semgrep_scan"]));
//!
//! client.initialize().await?;
//! let tools = client.list_tools().await?;
//! let result = client.call_tool("semgrep_scan", json!({"code_files": []})).await?;
//! ```

use crate::mcp::error::ClientError;
use crate::mcp::filter::ToolFilter;
use crate::mcp::protocol::{
    ClientCapabilities, ClientInfo, InitializeParams, McpError, McpMethod, McpNotification,
    McpRequest, McpResponse, ServerCapabilities, Tool, ToolCallParams, PROTOCOL_VERSION,
};
use crate::mcp::transport::Transport;
use anyhow::{Context, Result};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Round-trip timeout used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// High-level MCP client
///
/// # Lifecycle
///
/// 1. Create with `McpClient::new(transport)`
/// 2. Initialize with `client.initialize()`
/// 3. List and call tools
/// 4. Drop the client when done (transport kills the server)
///
/// A timed-out round trip leaves a half-read response on the wire, so the
/// client moves to [`ClientState::Disconnected`] and must be recreated.
pub struct McpClient<T>
where
    T: Transport,
{
    transport: T,

    /// Next request ID (monotonically increasing)
    next_id: AtomicU64,

    server_capabilities: Option<ServerCapabilities>,

    state: ClientState,

    timeout: Duration,

    tool_filter: ToolFilter,
}

/// Client state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Client is created but not initialized
    Created,

    /// Initialization is in progress
    Initializing,

    /// Client is initialized and ready
    Ready,

    /// Client is disconnected
    Disconnected,
}

impl<T> McpClient<T>
where
    T: Transport,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
            server_capabilities: None,
            state: ClientState::Created,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            tool_filter: ToolFilter::allow_all(),
        }
    }

    /// Bound every request/response round trip by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Restrict which tools are listed and callable
    pub fn with_tool_filter(mut self, filter: ToolFilter) -> Self {
        self.tool_filter = filter;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn tool_filter(&self) -> &ToolFilter {
        &self.tool_filter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn next_request(&self, method: McpMethod, params: Option<serde_json::Value>) -> McpRequest {
        McpRequest::new(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            method.as_str(),
            params,
        )
    }

    /// Send a request and wait for the response with the same id
    ///
    /// Responses carrying other ids (late answers to earlier requests) are
    /// discarded.
    async fn send_request(&mut self, request: &McpRequest) -> Result<McpResponse> {
        let timeout = self.timeout;
        let transport = &mut self.transport;

        let round_trip = async {
            transport.send(request).await?;
            loop {
                let response = transport.recv().await?;
                if response.id == request.id {
                    return Ok::<_, anyhow::Error>(response);
                }
                tracing::warn!(
                    "Discarding response id {} while waiting for {}",
                    response.id,
                    request.id
                );
            }
        };

        match tokio::time::timeout(timeout, round_trip).await {
            Ok(result) => result,
            Err(_) => {
                self.state = ClientState::Disconnected;
                tracing::warn!("MCP request '{}' timed out after {:?}", request.method, timeout);
                Err(ClientError::Timeout {
                    method: request.method.clone(),
                    timeout,
                }
                .into())
            }
        }
    }

    /// Initialize the MCP connection
    ///
    /// Sends `initialize`, records the server capabilities, then sends the
    /// `notifications/initialized` notification.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client was already initialized
    /// - Transport send/recv fails or times out
    /// - Server returns an error response or a malformed result
    pub async fn initialize(&mut self) -> Result<()> {
        if self.state != ClientState::Created {
            return Err(anyhow::anyhow!(
                "Cannot initialize client: invalid state {:?}",
                self.state
            ));
        }

        if !self.transport.is_connected() {
            return Err(anyhow::anyhow!(
                "Cannot initialize: transport is disconnected"
            ));
        }

        self.state = ClientState::Initializing;
        tracing::info!("Initializing MCP connection...");

        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: ClientInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        let request = self.next_request(McpMethod::Initialize, Some(json!(params)));

        let response = self
            .send_request(&request)
            .await
            .context("Failed to complete initialize request")?;

        let result = response
            .into_result()
            .map_err(|e| anyhow::anyhow!("Initialize failed: {}", e))?;

        let capabilities: ServerCapabilities = serde_json::from_value(result)
            .context("Failed to parse server capabilities from initialize response")?;

        self.transport
            .notify(&McpNotification::new(McpMethod::Initialized.as_str()))
            .await
            .context("Failed to send initialized notification")?;

        tracing::info!(
            "MCP connection initialized: {} v{} (protocol {})",
            capabilities.server_info.name,
            capabilities.server_info.version,
            capabilities.protocol_version
        );

        self.server_capabilities = Some(capabilities);
        self.state = ClientState::Ready;

        Ok(())
    }

    /// List the server's tools that pass the tool filter
    pub async fn list_tools(&mut self) -> Result<Vec<Tool>> {
        self.ensure_ready()?;

        tracing::debug!("Listing available tools from MCP server");

        let request = self.next_request(McpMethod::ToolsList, None);

        let response = self
            .send_request(&request)
            .await
            .context("Failed to complete tools/list request")?;

        let result = response
            .into_result()
            .map_err(|e| anyhow::anyhow!("Failed to list tools: {}", e))?;

        let offered: Vec<Tool> = serde_json::from_value(result["tools"].clone())
            .context("Failed to parse tools from response")?;
        let offered_count = offered.len();

        let tools = self.tool_filter.apply(offered);
        tracing::info!(
            "Server offers {} tools, {} permitted",
            offered_count,
            tools.len()
        );
        for tool in &tools {
            tracing::debug!("  - {}", tool.name);
        }

        Ok(tools)
    }

    /// Call a tool on the MCP server
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tool filter rejects `name` ([`ClientError::ToolNotAllowed`]);
    ///   no request is sent in that case
    /// - Client is not initialized
    /// - Transport send/recv fails or times out
    /// - Server returns an error response
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value> {
        if !self.tool_filter.is_allowed(name) {
            tracing::warn!("Refusing call to filtered tool '{}'", name);
            return Err(ClientError::ToolNotAllowed(name.to_string()).into());
        }

        self.ensure_ready()?;

        tracing::debug!("Calling tool: {} with arguments: {:?}", name, arguments);

        let params = ToolCallParams {
            name: name.to_string(),
            arguments,
        };
        let request = self.next_request(McpMethod::ToolsCall, Some(json!(params)));

        let response = self
            .send_request(&request)
            .await
            .with_context(|| format!("Failed to complete tools/call request for '{}'", name))?;

        let result = response
            .into_result()
            .map_err(|e: McpError| anyhow::anyhow!("Tool '{}' failed: {}", name, e))?;

        tracing::debug!("Tool '{}' returned result: {:?}", name, result);

        Ok(result)
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            ClientState::Created => Err(anyhow::anyhow!(
                "Client not initialized. Call initialize() first."
            )),
            ClientState::Initializing => Err(anyhow::anyhow!("Client is currently initializing")),
            ClientState::Ready => Ok(()),
            ClientState::Disconnected => Err(anyhow::anyhow!("Client is disconnected")),
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// `None` until `initialize()` succeeds
    pub fn server_capabilities(&self) -> Option<&ServerCapabilities> {
        self.server_capabilities.as_ref()
    }
}
