//! Launch parameters for the Semgrep MCP server
//!
//! The server runs through `uvx`, which installs the pinned `semgrep-mcp`
//! release into a throwaway virtualenv on a pinned Python, so nothing has to
//! be preinstalled besides `uv`.

use crate::mcp::{Environment, StdioServerParams};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};

/// Launcher executable
pub const LAUNCHER: &str = "uvx";

/// Python 3.14 breaks the protobuf wheels semgrep depends on
pub const PYTHON_VERSION: &str = "3.12";

/// MCP SDK release the pinned server was built against
pub const MCP_SDK_PIN: &str = "mcp==1.12.2";

/// Last release before the standalone package was deprecated
pub const SEMGREP_MCP_PIN: &str = "semgrep-mcp==0.8.1";

/// Proxy variables forwarded to the launcher, both spellings
///
/// `uv` downloads Python and packages at launch time, so behind a proxy
/// these have to reach it.
pub const PROXY_VARS: [&str; 6] = [
    "http_proxy",
    "https_proxy",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "no_proxy",
    "NO_PROXY",
];

/// Pinned launch line, as configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Launcher executable (`uvx`)
    pub command: String,

    /// Interpreter version passed to `--python`
    pub python: String,

    /// Extra requirements, one `--with` each
    pub with: Vec<String>,

    /// Pass `--quiet` so uv keeps install chatter off the wire
    pub quiet: bool,

    /// The server package requirement
    pub package: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            command: LAUNCHER.to_string(),
            python: PYTHON_VERSION.to_string(),
            with: vec![MCP_SDK_PIN.to_string()],
            quiet: true,
            package: SEMGREP_MCP_PIN.to_string(),
        }
    }
}

impl LauncherConfig {
    /// Argument list for the launcher
    ///
    /// Depends only on the pins, never on the environment.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["--python".to_string(), self.python.clone()];
        for requirement in &self.with {
            args.push("--with".to_string());
            args.push(requirement.clone());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args.push(self.package.clone());
        args
    }
}

/// Snapshot of the current process environment
pub fn process_environment() -> Environment {
    std::env::vars_os().collect()
}

/// Build the launch parameters from an explicit environment
///
/// The returned environment is a copy of `env` with every present proxy
/// variable set again to its own value. Nothing is removed and absent proxy
/// variables are not invented; `env` itself is untouched.
pub fn build_server_params(env: &Environment, launcher: &LauncherConfig) -> StdioServerParams {
    let mut child_env = env.clone();

    for var in PROXY_VARS {
        if let Some(value) = env.get(OsStr::new(var)) {
            tracing::debug!("Forwarding proxy variable {}", var);
            child_env.insert(OsString::from(var), value.clone());
        }
    }

    StdioServerParams {
        command: launcher.command.clone(),
        args: launcher.args(),
        env: child_env,
    }
}

/// Launch parameters for the pinned server, using the process environment
pub fn semgrep_server_params() -> StdioServerParams {
    build_server_params(&process_environment(), &LauncherConfig::default())
}

/// Names of the proxy variables present in `env`, in [`PROXY_VARS`] order
pub fn present_proxy_vars(env: &Environment) -> Vec<&'static str> {
    PROXY_VARS
        .into_iter()
        .filter(|var| env.contains_key(OsStr::new(var)))
        .collect()
}
