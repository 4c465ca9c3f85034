//! MCP Transport Layer
//!
//! The transport only moves messages. JSON-RPC framing lives in the protocol
//! layer; request/response matching and timeouts live in the client.

use crate::mcp::protocol::{McpNotification, McpRequest, McpResponse};
use crate::mcp::server::StdioServerParams;
use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Transport trait for MCP communication
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Send a request to the MCP server
    async fn send(&mut self, request: &McpRequest) -> Result<()>;

    /// Send a notification (no response expected)
    async fn notify(&mut self, notification: &McpNotification) -> Result<()>;

    /// Receive the next response from the MCP server
    ///
    /// Server-initiated messages (notifications, requests) are not responses
    /// and must not be returned here.
    async fn recv(&mut self) -> Result<McpResponse>;

    /// Check if the transport is still connected
    fn is_connected(&self) -> bool;
}

/// stdio transport for local MCP servers
///
/// Spawns the server as a child process and exchanges newline-delimited
/// JSON-RPC messages over its stdin/stdout. The child's environment is
/// exactly `params.env`; nothing else leaks in from the parent.
pub struct StdioTransport {
    child: Option<Child>,

    stdin: ChildStdin,

    stdout: BufReader<ChildStdout>,

    /// Server command line (for diagnostics)
    command: String,

    connected: bool,

    /// Reusable buffer for reading lines
    line_buffer: String,
}

impl StdioTransport {
    /// Spawn the MCP server described by `params`
    ///
    /// ```ignore
    /// let params = semgrep_server_params();
    /// let transport = StdioTransport::spawn(&params).await?;
    /// ```
    pub async fn spawn(params: &StdioServerParams) -> Result<Self> {
        tracing::info!("Spawning MCP server: {}", params.command);
        tracing::debug!(
            "Server arguments: {:?} ({} environment variables)",
            params.args,
            params.env.len()
        );

        let mut child = Command::new(&params.command)
            .args(&params.args)
            .env_clear()
            .envs(&params.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            // uvx progress and server logs go to our stderr
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to spawn MCP server process '{}'", params.command))?;

        let stdin = child.stdin.take().context("Failed to get child stdin")?;
        let stdout = child.stdout.take().context("Failed to get child stdout")?;

        Ok(Self {
            child: Some(child),
            stdin,
            stdout: BufReader::new(stdout),
            command: params.command_line(),
            connected: true,
            line_buffer: String::with_capacity(4096),
        })
    }

    /// Get the server command string (for diagnostics)
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Kill the MCP server process and wait for it to exit
    pub async fn kill(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            tracing::info!("Killing MCP server: {}", self.command);
            child
                .kill()
                .await
                .context("Failed to kill MCP server process")?;
        }
        self.connected = false;
        Ok(())
    }

    async fn write_line(&mut self, json: &str) -> Result<()> {
        if !self.connected {
            return Err(anyhow::anyhow!("Transport is not connected"));
        }

        tracing::debug!("Sending to MCP server: {}", json);

        self.stdin
            .write_all(json.as_bytes())
            .await
            .context("Failed to write to MCP server stdin")?;
        self.stdin
            .write_all(b"\n")
            .await
            .context("Failed to write newline to MCP server stdin")?;
        self.stdin
            .flush()
            .await
            .context("Failed to flush MCP server stdin")?;

        Ok(())
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            tracing::debug!("Dropping StdioTransport, killing MCP server");
            // Can't await in Drop; start the kill and let the runtime reap it
            let _ = child.start_kill();
        }
    }
}

/// Decode one stdout line
///
/// Returns `Ok(None)` for lines that are not responses: blank lines, stray
/// non-JSON output, server notifications and server-to-client requests
/// (anything with a `method`). JSON that is none of these is an error.
pub(crate) fn parse_server_line(line: &str) -> Result<Option<McpResponse>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            // uvx and the server may print banners or warnings to stdout
            tracing::warn!("Ignoring non-JSON line from MCP server ({}): {}", e, trimmed);
            return Ok(None);
        }
    };

    if let Some(method) = value.get("method").and_then(|m| m.as_str()) {
        tracing::debug!("Ignoring server-initiated message: {}", method);
        return Ok(None);
    }

    let response: McpResponse = serde_json::from_value(value)
        .with_context(|| format!("Failed to deserialize MCP response from JSON: {}", trimmed))?;
    Ok(Some(response))
}

impl Transport for StdioTransport {
    async fn send(&mut self, request: &McpRequest) -> Result<()> {
        let json =
            serde_json::to_string(request).context("Failed to serialize MCP request to JSON")?;
        self.write_line(&json).await
    }

    async fn notify(&mut self, notification: &McpNotification) -> Result<()> {
        let json = serde_json::to_string(notification)
            .context("Failed to serialize MCP notification to JSON")?;
        self.write_line(&json).await
    }

    async fn recv(&mut self) -> Result<McpResponse> {
        if !self.connected {
            return Err(anyhow::anyhow!("Transport is not connected"));
        }

        loop {
            self.line_buffer.clear();

            let bytes_read = self
                .stdout
                .read_line(&mut self.line_buffer)
                .await
                .context("Failed to read from MCP server stdout")?;

            if bytes_read == 0 {
                self.connected = false;
                return Err(anyhow::anyhow!(
                    "MCP server '{}' closed connection (EOF)",
                    self.command
                ));
            }

            tracing::debug!("Received from MCP server: {}", self.line_buffer.trim());

            if let Some(response) = parse_server_line(&self.line_buffer)? {
                return Ok(response);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected && self.child.is_some()
    }
}
