//! Scanbridge Library
//!
//! Bootstraps the Semgrep security scanner as a stdio MCP server for agent
//! frameworks: builds the pinned launch parameters, wraps them in a client
//! handle that only permits `semgrep_scan`, and provides the small MCP client
//! that drives it.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod scan_command;
pub mod semgrep;
