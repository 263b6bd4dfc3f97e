//! pluginsfetcher server
//!
//! # Usage
//!
//! ```bash
//! pluginsfetcher [--config <path>]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `pluginsfetcher=info`)
//!
//! # Protocol
//!
//! JSON-RPC 2.0 over stdio, one message per line. Responses go to stdout,
//! logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use pluginsfetcher_core::ServiceConfig;
use pluginsfetcher_rpc::PluginsFetcherServer;
use tracing_subscriber::EnvFilter;

/// Plugin inventory reporting server
#[derive(Parser)]
#[command(name = "pluginsfetcher")]
#[command(about = "Report installed plugins and host software versions over JSON-RPC")]
#[command(version)]
struct Args {
    /// Path to the server configuration
    #[arg(short, long, default_value = "pluginsfetcher.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is reserved for responses
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pluginsfetcher=info,pluginsfetcher_rpc=info,pluginsfetcher_core=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!(config = ?args.config, "Starting pluginsfetcher server");

    let config = ServiceConfig::load(&args.config)?;
    let server = PluginsFetcherServer::from_config(&config);
    server.run().await?;

    Ok(())
}
