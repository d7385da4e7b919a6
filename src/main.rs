//! estate-market (v1)
//!
//! The marketplace's server-side operations behind one Axum service.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────────┐
//!                  │                      ESTATE MARKET                       │
//!                  │                                                          │
//!   Client ───────▶│  http (request id, trace, timeout, limits, metrics)      │
//!                  │     │                                                    │
//!                  │     ├─▶ listings ──────┐                                 │
//!                  │     ├─▶ identity ──────┼──▶ store (documents, media)     │
//!                  │     ├─▶ maintenance ───┤──▶ mail API                     │
//!                  │     ├─▶ agreement ─────┘──▶ ledger (EVM) or simulation   │
//!                  │     └─▶ prediction ───────▶ model server                 │
//!                  │                                                          │
//!                  │  config (TOML + env, hot reload) · lifecycle · admin     │
//!                  └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use estate_market::config::loader::{load_config, load_default};
use estate_market::config::watcher::ConfigWatcher;
use estate_market::http::HttpServer;
use estate_market::lifecycle::{build_components, signals::spawn_signal_listener, Shutdown};
use estate_market::observability::{logging::init_logging, metrics::init_metrics};

#[derive(Parser)]
#[command(name = "estate-market", version, about = "Real-estate marketplace API server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "ESTATE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_config(path),
        None => load_default(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            init_logging(None);
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(Some(&config.observability.log_level));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "estate-market starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        mail_enabled = config.mail.enabled,
        blockchain_enabled = config.blockchain.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let components = build_components(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload unavailable");
                    (None, updates)
                }
            }
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let server = HttpServer::new(config, components)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
