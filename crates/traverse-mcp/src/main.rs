//! Traverse MCP Server
//!
//! Exposes UI automation tools to Claude and other AI assistants via the
//! Model Context Protocol (MCP).
//!
//! Usage:
//!   traverse-mcp [--config <path>] [--engine <command>] [--dry-run]
//!
//! The server communicates over stdio using JSON-RPC 2.0.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use traverse_core::Executor;
use traverse_mcp::{Config, McpServer, ToolHandler};

#[derive(Parser)]
#[command(name = "traverse-mcp")]
#[command(about = "MCP server for UI automation with accessibility traversal")]
#[command(version)]
#[command(after_help = "\
The engine command receives {\"action\": .., \"options\": ..} as JSON on stdin
and must print an ActionResult as JSON on stdout. Without one, the server runs
in dry-run mode and performs no actions.

ENVIRONMENT:
    TRAVERSE_MCP_CONFIG   Config file path (default: <config dir>/traverse-mcp/config.toml)
    RUST_LOG              Log filter (logs go to stderr)")]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engine helper command (overrides config)
    #[arg(long)]
    engine: Option<String>,

    /// Perform no actions; report success for every call
    #[arg(long, conflicts_with = "engine")]
    dry_run: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(engine) = cli.engine {
        config.engine.command = Some(engine);
    }

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    tracing::info!("Starting traverse MCP server");

    let executor = Executor::spawn(config.build_engine(cli.dry_run))
        .context("Failed to start automation engine")?;
    let handler = ToolHandler::new(executor, config.options_builder());

    let mut server = McpServer::new(handler);
    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
