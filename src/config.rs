// Configuration File Support
//
// TOML configuration for scanbridge with environment variable overrides.
// Loaded from the XDG config directory: ~/.config/scanbridge/config.toml
// Every field is optional; defaults reproduce the pinned Semgrep launch.

use crate::semgrep::params::LauncherConfig;
use crate::semgrep::server::{ALLOWED_TOOLS, CLIENT_SESSION_TIMEOUT_SECS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "SCANBRIDGE_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,

    pub semgrep: SemgrepConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Semgrep server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemgrepConfig {
    /// Session timeout in seconds, applied to every MCP round trip
    pub timeout_secs: u64,

    /// Tools the client may list and call
    pub allowed_tools: Vec<String>,

    /// Pinned launch line
    pub launcher: LauncherConfig,
}

impl Default for SemgrepConfig {
    fn default() -> Self {
        Self {
            timeout_secs: CLIENT_SESSION_TIMEOUT_SECS,
            allowed_tools: ALLOWED_TOOLS.iter().map(|t| t.to_string()).collect(),
            launcher: LauncherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// A missing file yields the defaults (with env overrides applied).
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::config_path())
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the resulting configuration fails validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?;
            tracing::info!("Loaded configuration from {:?}", path);
            config
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        let config = config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/scanbridge/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("dev", "scanbridge", "scanbridge") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".config")
                .join("scanbridge")
                .join("config.toml")
        }
    }

    /// Apply overrides from the process environment
    fn apply_env_overrides(self) -> Self {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`:
    /// - SCANBRIDGE_LOG_LEVEL
    /// - SCANBRIDGE_LOG_FORMAT
    ///
    /// Launch pins and the session timeout come only from the config file.
    pub fn apply_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        let semgrep = &self.semgrep;
        if semgrep.timeout_secs == 0 {
            anyhow::bail!("Semgrep session timeout must be > 0 seconds");
        }
        if semgrep.allowed_tools.is_empty() {
            anyhow::bail!("At least one Semgrep tool must be allowed");
        }
        if semgrep.launcher.command.trim().is_empty() {
            anyhow::bail!("Semgrep launcher command is empty");
        }
        if semgrep.launcher.python.trim().is_empty() {
            anyhow::bail!("Semgrep Python version is empty");
        }
        if semgrep.launcher.package.trim().is_empty() {
            anyhow::bail!("Semgrep MCP package requirement is empty");
        }

        Ok(())
    }
}
