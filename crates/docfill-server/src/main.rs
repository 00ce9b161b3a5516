//! Docfill server binary
//!
//! Starts the HTTP server for document upload, status polling and template
//! generation.

use anyhow::Context;
use clap::Parser;
use docfill_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Docfill - find and replace the variable fields of a document
#[derive(Debug, Parser)]
#[command(name = "docfill-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "DOCFILL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address and port (e.g. 0.0.0.0:3000)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            tracing::warn!("No config file specified, using defaults");
            ServerConfig::default()
        }
    };

    if let Some(bind) = &args.bind {
        let (address, port) = bind
            .rsplit_once(':')
            .with_context(|| format!("--bind must be ADDRESS:PORT, got {}", bind))?;
        config.bind_address = address.to_string();
        config.bind_port = port
            .parse()
            .with_context(|| format!("invalid port in --bind: {}", port))?;
    }

    start_server(config).await?;
    Ok(())
}
