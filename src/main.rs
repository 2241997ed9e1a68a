//! Account data MCP server entry point.
//!
//! Loads an optional `.env` file, reads the API configuration from the
//! environment, then serves the `get-account-data` tool over stdio.

mod client;
mod config;
mod error;
mod response;
mod server;

use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use crate::client::ApiClient;
use crate::config::{Config, optional_env_file};
use crate::server::AccountDataServer;

/// Runs the MCP server.
///
/// # Errors
///
/// Returns an error if a `.env` file exists but cannot be loaded, a
/// configuration variable is missing, the HTTP client cannot be built,
/// or the stdio transport encounters an error.
async fn run() -> Result<(), Box<dyn core::error::Error>> {
    // Loaded before the subscriber so RUST_LOG may come from the file.
    let env_file = dotenvy::dotenv();

    // Initialise tracing to stderr (stdout is used for MCP stdio transport).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("starting account data MCP server");

    if let Some(path) = optional_env_file(env_file)? {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    let client = ApiClient::new(config)?;

    let mcp_server = AccountDataServer::new(client);
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = mcp_server.serve(transport).await?;

    tracing::info!("MCP server running on stdio");
    let _quit_reason = service.waiting().await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(%err, "fatal error");
        std::process::exit(1);
    }
}
