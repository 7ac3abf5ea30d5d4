//! Wati MCP server
//!
//! Serves the WhatsApp tools to an MCP client over stdin/stdout.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, init_logging};
use presentation_mcp::{McpServer, ToolDispatcher, catalogue};
use tracing::info;

/// Wati WhatsApp MCP server
#[derive(Parser)]
#[command(name = "wati-mcp")]
#[command(author, version, about = "WhatsApp tools for MCP clients, backed by Wati", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./wati-mcp.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Serve,

    /// Print the tool catalogue as JSON and exit
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&catalogue())?);
            Ok(())
        },
        Commands::Serve => serve(cli.config, cli.verbose).await,
    }
}

async fn serve(config_path: Option<PathBuf>, verbosity: u8) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging, verbosity).context("Failed to initialize logging")?;

    info!(
        base_url = %config.api_base_url,
        tenant = %config.tenant_id,
        scratch_dir = %config.media.scratch_dir.display(),
        "Starting Wati MCP server"
    );

    let dispatcher =
        ToolDispatcher::from_config(&config).context("Failed to create Wati client")?;
    McpServer::new(dispatcher)
        .serve_stdio()
        .await
        .context("MCP server failed")?;

    Ok(())
}
