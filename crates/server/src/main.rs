//! lifi-sw server entry point.
//!
//! Loads configuration, registers the offline worker against the configured
//! origin, and serves the MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use lifi_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod host;
mod state;
#[cfg(test)]
mod testing;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        db_path = %config.db_path.display(),
        "Starting lifi-sw server on stdio transport"
    );

    let state = state::AppState::start(&config).await?;
    let handler = handler::LifiServer::new(Arc::new(state));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
