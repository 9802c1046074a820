//! Barcode image HTTP service
//!
//! Renders Code 39, Code 128, EAN and PDF417 symbols as GIF, JPEG or PNG
//! images behind a small regex-routed HTTP interface.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http server ──▶ routing dispatcher ──▶ barcode handler
//!                    (axum, layers)   (method + regex)        │
//!                                                             ▼
//!                                                  etag ─▶ 304 on match
//!                                                             │
//!                                                             ▼
//!     Client Response                               symbology encoder
//!     ◀───────────── image bytes ◀── raster ◀── BarModel::scale
//!
//!     Cross-cutting: config, lifecycle (signals, shutdown), observability
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use barcode_server::config::{load_config, ObservabilityConfig};
use barcode_server::lifecycle::signals::spawn_signal_listener;
use barcode_server::observability::{logging, metrics};
use barcode_server::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "barcode-server", version, about = "Barcode image HTTP service")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "BARCODE_SERVER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    logging::init_logging(&config.observability);

    tracing::info!("barcode-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        request_timeout_secs = config.timeouts.request_secs,
        grace_period_secs = config.shutdown.grace_period_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = match TcpListener::bind(config.listener.bind_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                address = %config.listener.bind_address(),
                error = %e,
                "Failed to bind listener"
            );
            return Err(e.into());
        }
    };
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    if let Err(e) = server.run(listener, receiver).await {
        tracing::error!(error = %e, "Server terminated abnormally");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
