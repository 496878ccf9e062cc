//! Player-info lookup proxy.
//!
//! Forwards `GET /player-info?uid=...` to the upstream player service and
//! returns the account name alongside the raw payload.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 PLAYER PROXY                  │
//!     Client Request      │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!     ────────────────────┼─▶│  access  │──▶│   rate   │──▶│  player  │  │
//!                         │  │   gate   │   │  limiter │   │  handler │  │
//!                         │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                         │                                     │        │
//!                         │                                     ▼        │
//!     Client Response     │  ┌──────────┐                ┌──────────┐    │
//!     ◀───────────────────┼──│ response │◀───────────────│ upstream │◀───┼──── Upstream
//!                         │  │normalize │                │ +timeout │    │     Service
//!                         │  └──────────┘                └──────────┘    │
//!                         │                                              │
//!                         │   /health          static site (fallback)    │
//!                         └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use player_proxy::config::load_config;
use player_proxy::config::watcher::ConfigWatcher;
use player_proxy::http::HttpServer;
use player_proxy::lifecycle::{panic::install_panic_hook, signals, Shutdown};
use player_proxy::observability::{init_logging, metrics};

#[derive(Parser)]
#[command(name = "player-proxy")]
#[command(about = "Player-info lookup proxy", long_about = None)]
struct Args {
    /// Optional TOML configuration file, watched for changes.
    #[arg(short, long, env = "PLAYER_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port; overrides the file and `PORT`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.port)?;

    init_logging(&config.observability);
    install_panic_hook();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "player-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.base_url,
        upstream_timeout_ms = config.upstream.timeout_ms,
        access_gate = config.access.enabled,
        rate_limit = config.rate_limit.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.with_port_override(args.port).run() {
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

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        pid = std::process::id(),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
