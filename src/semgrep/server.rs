//! Semgrep MCP server factory

use crate::config::SemgrepConfig;
use crate::mcp::{Environment, McpServerStdio, ToolFilter};
use crate::semgrep::params::{build_server_params, process_environment};
use std::time::Duration;

/// Name the handle reports in logs and errors
pub const SERVER_NAME: &str = "semgrep";

/// The scanning tool exposed by `semgrep-mcp`
pub const SEMGREP_SCAN_TOOL: &str = "semgrep_scan";

/// Tools agents may invoke on the server
pub const ALLOWED_TOOLS: &[&str] = &[SEMGREP_SCAN_TOOL];

/// First-run `uvx` installs can take well over a minute
pub const CLIENT_SESSION_TIMEOUT_SECS: u64 = 120;

/// Handle to the pinned Semgrep server, allowing only `semgrep_scan`
///
/// Reads the process environment; starts nothing until `connect()`.
pub fn create_semgrep_server() -> McpServerStdio {
    create_semgrep_server_with(&process_environment(), &SemgrepConfig::default())
}

/// Same as [`create_semgrep_server`] with the environment and settings injected
pub fn create_semgrep_server_with(env: &Environment, config: &SemgrepConfig) -> McpServerStdio {
    let params = build_server_params(env, &config.launcher);
    let timeout = Duration::from_secs(config.timeout_secs);
    let filter = ToolFilter::allow(config.allowed_tools.iter().cloned());

    tracing::debug!(
        "Semgrep server: {} (timeout {:?}, tools {:?})",
        params.command_line(),
        timeout,
        config.allowed_tools
    );

    McpServerStdio::new(SERVER_NAME, params, timeout, filter)
}
