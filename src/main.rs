// Scanbridge - Main Entry Point
//
// CLI around the Semgrep MCP bootstrap:
// - params: show the launch line and forwarded proxy variables
// - tools:  start the server and list the tools agents may use
// - scan:   run semgrep_scan over local files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scanbridge::config::Config;
use scanbridge::mcp::Environment;
use scanbridge::scan_command::{describe_params, execute_scan, list_permitted_tools};
use scanbridge::semgrep::{create_semgrep_server_with, process_environment};
use std::path::PathBuf;
use tracing::info;

/// Scanbridge: Semgrep MCP launcher
#[derive(Parser, Debug)]
#[command(name = "scanbridge")]
#[command(author = "Scanbridge Contributors")]
#[command(version)]
#[command(about = "Launch the Semgrep MCP server for security analysis agents", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a config file (default: ~/.config/scanbridge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the launch parameters as JSON
    Params {
        /// Include environment values (may contain credentials)
        #[arg(long)]
        show_env: bool,
    },
    /// Start the server and list the permitted tools
    Tools,
    /// Scan files with semgrep_scan
    Scan {
        /// Files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Semgrep rule config (e.g. "p/security-audit")
        #[arg(long)]
        rules: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    scanbridge::logging::init(&config.logging, args.verbose)?;

    info!("Scanbridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let env = process_environment();

    match args.command {
        Some(Commands::Params { show_env }) => print_params(&env, &config, show_env)?,
        Some(Commands::Tools) => list_tools(&env, &config).await?,
        Some(Commands::Scan { files, rules }) => scan(&env, &config, &files, rules).await?,
        None => {
            info!("No command specified. Use \"scanbridge --help\" for usage.");
        }
    }

    Ok(())
}

fn print_params(env: &Environment, config: &Config, show_env: bool) -> Result<()> {
    let server = create_semgrep_server_with(env, &config.semgrep);
    let description = describe_params(server.params(), show_env);
    println!(
        "{}",
        serde_json::to_string_pretty(&description).context("Failed to render parameters")?
    );
    Ok(())
}

async fn list_tools(env: &Environment, config: &Config) -> Result<()> {
    let mut server = create_semgrep_server_with(env, &config.semgrep);

    info!("🔌 Starting Semgrep MCP server (first run may download packages)...");
    let tools = list_permitted_tools(&mut server)
        .await
        .context("Failed to list Semgrep tools")?;

    if tools.is_empty() {
        tracing::warn!("Server offers none of the allowed tools");
    }
    for tool in &tools {
        println!("{}\t{}", tool.name, tool.description.lines().next().unwrap_or(""));
    }
    Ok(())
}

async fn scan(
    env: &Environment,
    config: &Config,
    files: &[PathBuf],
    rules: Option<String>,
) -> Result<()> {
    let mut server = create_semgrep_server_with(env, &config.semgrep);

    let outcome = execute_scan(&mut server, files, rules.as_deref())
        .await
        .context("Semgrep scan failed")?;

    if outcome.text.is_empty() {
        println!("{}", serde_json::to_string_pretty(&outcome.raw)?);
    }
    for block in &outcome.text {
        // Scan results arrive as JSON text; pretty-print when possible
        match serde_json::from_str::<serde_json::Value>(block) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{}", block),
        }
    }

    if outcome.is_error {
        anyhow::bail!("semgrep_scan reported an error");
    }
    Ok(())
}
