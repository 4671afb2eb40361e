//! simpleindex
//!
//! A PEP 503 simple repository server built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ────────▶ http::server ──▶ routing::RouteTable ──┬──▶ path     (local directory)
//!               (request id,     (match key, capture    ├──▶ redirect (302 upstream)
//!                trace, timeout)  placeholders)         └──▶ proxy    (relay upstream)
//!     ◀──────── IndexResponse ◀─────────────────────────────┘
//!
//!     Cross-cutting: config (TOML), observability (tracing, metrics),
//!                    resilience (upstream timeouts), lifecycle (signals)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use simpleindex::config::load_config;
use simpleindex::lifecycle::{signals, Shutdown};
use simpleindex::observability::{logging, metrics};
use simpleindex::{HttpServer, RouteTable};

#[derive(Parser, Debug)]
#[command(name = "simpleindex", version, about = "PEP 503 simple repository server")]
struct Cli {
    /// Path to the TOML configuration file
    config: PathBuf,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    /// Validate the configuration, print the route table and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match load_config(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("simpleindex: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config = loaded.config;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(level);

    tracing::info!(
        config = %cli.config.display(),
        root = %loaded.base_dir.display(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let table = match RouteTable::from_config(&config, &loaded.base_dir) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build route table");
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        for (key, entry) in table.iter() {
            println!("{key}\t{}\t{}", entry.route.kind(), entry.route.to());
        }
        return ExitCode::SUCCESS;
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.server.bind_address();
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(table, &config.server);
    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
