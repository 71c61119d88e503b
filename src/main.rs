//! Vinyl edge gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                     GATEWAY                          │
//!   Client Request  │  ┌────────┐   ┌────────┐   ┌───────┐   ┌──────────┐  │
//!   ────────────────┼─▶│ origin │──▶│ route  │──▶│ cred. │──▶│ forwarder│──┼──▶ user / catalog /
//!                   │  │ policy │   │ table  │   │ gate  │   │  + pool  │  │    rating / playlist
//!   Client Response │  └────────┘   └────────┘   └───────┘   └──────────┘  │
//!   ◀───────────────┼──────── CORS headers on every outcome ◀──────────────┼──── upstream response
//!                   │                                                      │
//!                   │  config · logging · metrics · lifecycle              │
//!                   └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use vinyl_gateway::config::load_config;
use vinyl_gateway::lifecycle::{shutdown_signal, Shutdown};
use vinyl_gateway::observability::{logging, metrics};
use vinyl_gateway::GatewayServer;

#[derive(Parser, Debug)]
#[command(name = "vinyl-gateway", version, about = "Edge API gateway for the vinyl services")]
struct Cli {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Installed first so warnings from config loading are not lost.
    let log = logging::init_logging("info");

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            return Err(e.into());
        }
    };

    log.set_level(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "vinyl-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        drain_timeout_secs = config.timeouts.drain_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already checked by validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = GatewayServer::new(config)?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
