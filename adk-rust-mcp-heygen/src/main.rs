//! ADK Rust MCP HeyGen Server
//!
//! MCP server for avatar video generation using the HeyGen API.

use adk_rust_mcp_common::{ConfigError, McpServerBuilder, TransportArgs};
use adk_rust_mcp_heygen::{Config, HeyGenServer};
use anyhow::{Context, Result, anyhow};
use clap::Parser;

/// Command-line arguments for the HeyGen server.
#[derive(Parser, Debug)]
#[command(name = "adk-rust-mcp-heygen")]
#[command(about = "MCP server for avatar video generation using HeyGen")]
struct Args {
    /// HeyGen API key
    #[arg(long, env = "HEYGEN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    adk_rust_mcp_common::tracing::init_tracing();

    tracing::info!("adk-rust-mcp-heygen server starting...");

    // Parse command-line arguments
    let args = Args::parse();

    let config = Config::load(args.api_key).map_err(|e| match e {
        ConfigError::MissingEnvVar(_) => anyhow!(
            "HeyGen API key not provided. Set it using --api-key or the HEYGEN_API_KEY environment variable"
        ),
        other => anyhow::Error::new(other).context("Invalid configuration"),
    })?;
    tracing::info!(
        base_url = %config.base_url,
        download_dir = %config.download_dir.display(),
        "Configuration loaded"
    );

    let server = HeyGenServer::from_config(&config).context("Failed to create HeyGen client")?;

    // Build and run the MCP server
    let transport = args.transport.into_transport();
    tracing::info!(transport = %transport, "Starting MCP server");

    McpServerBuilder::new(server)
        .with_transport(transport)
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
