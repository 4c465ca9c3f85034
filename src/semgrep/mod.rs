//! Semgrep MCP server bootstrap
//!
//! Two steps, always in this order:
//!
//! 1. [`params`]: build the launch parameters (pinned `uvx` command line and
//!    a copy of the environment with proxy variables forwarded)
//! 2. [`server`]: wrap them in an [`McpServerStdio`](crate::mcp::McpServerStdio)
//!    with a 120 s session timeout that may only call `semgrep_scan`

pub mod params;

pub mod server;

pub use params::{
    build_server_params, present_proxy_vars, process_environment, semgrep_server_params,
    LauncherConfig, PROXY_VARS,
};
pub use server::{
    create_semgrep_server, create_semgrep_server_with, ALLOWED_TOOLS,
    CLIENT_SESSION_TIMEOUT_SECS, SEMGREP_SCAN_TOOL, SERVER_NAME,
};

#[cfg(test)]
mod proptests;
