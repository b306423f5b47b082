//! lwotgd entry point.

use anyhow::{Context, Result};
use clap::Parser;
use lwotg_host::{HostNetwork, LinuxHost};
use lwotgd::{api, hint_channel, spawn_hint_logger, ArpAnnouncer, DaemonConfig, Server};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Lightweight traffic-generator control plane.
#[derive(Debug, Parser)]
#[command(name = "lwotgd", version, about)]
struct Cli {
    /// Daemon configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API listen address, overrides the configuration file.
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Hint channel capacity, overrides the configuration file.
    #[arg(long)]
    hint_capacity: Option<usize>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    info!("Starting lwotgd");

    let config = load_config(&cli)?;
    run(config).await?;

    info!("lwotgd exiting");
    Ok(())
}

fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set logger: {}", e))
}

fn load_config(cli: &Cli) -> Result<DaemonConfig> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DaemonConfig::default(),
    };

    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(capacity) = cli.hint_capacity {
        config.hint_capacity = capacity;
    }
    config.validate()?;
    Ok(config)
}

async fn run(config: DaemonConfig) -> Result<()> {
    let host: Arc<dyn HostNetwork> = Arc::new(LinuxHost::new(config.host.clone()));

    let server = Arc::new(Server::new(host.clone()));
    let (hint_tx, hint_rx) = hint_channel(config.hint_capacity);
    server.set_hint_channel(hint_tx);
    let hint_logger = spawn_hint_logger(hint_rx);
    server.set_protocol_handler(Arc::new(ArpAnnouncer::new(host)));

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(listen = %config.listen, hint_capacity = config.hint_capacity, "API listening");

    axum::serve(listener, api::router(server.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    let dropped = server.hints().dropped();
    if dropped > 0 {
        warn!(dropped, "Hints were dropped under backpressure");
    }
    drop(server);
    hint_logger.abort();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["lwotgd", "--listen", "127.0.0.1:9999", "--hint-capacity", "8"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.listen.port(), 9999);
        assert_eq!(config.hint_capacity, 8);
    }

    #[test]
    fn test_cli_zero_capacity_rejected() {
        let cli = Cli::parse_from(["lwotgd", "--hint-capacity", "0"]);
        assert!(load_config(&cli).is_err());
    }
}
