//! Huddle serve command
//!
//! Runs the relay server in the foreground:
//! - WebSocket upgrade endpoint for browser clients
//! - Read-only diagnostics for clients and sessions
//! - Health endpoint

use anyhow::Result;
use clap::Args;
use huddle_server::{HuddleServer, ServerConfig};
use tracing::info;

use crate::config::{ConfigLoader, HuddleConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = server_config(ConfigLoader::load()?, &args);
    info!(
        "Starting huddle server on {} (ids {}..={})",
        config.addr(),
        config.hub.id_base,
        config.hub.id_ceiling
    );

    HuddleServer::new(config).run().await.map_err(Into::into)
}

/// Apply command-line overrides on top of the loaded configuration
fn server_config(config: HuddleConfig, args: &ServeArgs) -> ServerConfig {
    let host = args.host.clone().unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    ServerConfig::new(host, port).with_hub(config.hub.to_hub_config())
}
