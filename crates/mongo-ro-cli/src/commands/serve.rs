//! `mongo-ro serve`
//!
//! Loads the optional config file, applies command-line overrides, resolves
//! the connection string from the environment and runs the MCP server until
//! its transport ends or Ctrl-C.

use anyhow::{Context, Result};
use clap::Args;
use mongo_ro_core::{AppConfig, Transport};
use mongo_ro_mcp::{McpServer, MongoConnector, lifecycle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Arguments for `mongo-ro serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "mongo-ro.yaml")]
    pub config: PathBuf,

    /// Transport type (stdio or http). Overrides config file.
    #[arg(long)]
    pub transport: Option<Transport>,

    /// HTTP host (only for http transport). Overrides config file.
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port (only for http transport). Overrides config file.
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(transport) = self.transport {
            config.mcp.transport = transport;
        }
        if let Some(host) = &self.host {
            config.mcp.host = host.clone();
        }
        if let Some(port) = self.port {
            config.mcp.port = port;
        }
    }
}

/// Load `path`, or the defaults when it does not exist.
fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))
    } else {
        warn!(config = %path.display(), "Config file not found, using defaults");
        Ok(AppConfig::default())
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    args.apply_overrides(&mut config);

    // Checked before anything is registered so a misconfigured process exits at once.
    let uri = config.upstream.resolve_uri()?;

    info!(
        transport = ?config.mcp.transport,
        read_preference = ?config.upstream.read_preference,
        "Starting mongo-ro"
    );

    let connector = MongoConnector::new(uri, config.upstream.clone());
    let server = McpServer::with_connector(config.mcp, Arc::new(connector))
        .context("Failed to register tools")?;

    lifecycle::run_until_shutdown(Arc::new(server), lifecycle::interrupt()).await?;

    info!("mongo-ro stopped");
    Ok(())
}
