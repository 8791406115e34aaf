//! urlrank: a single-node URL popularity index.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /add ───▶ ┌──────────┐  bounded   ┌─────────┐
//!                   │  ingest  │──queue────▶│ workers │──┐
//!                   │ admission│            └─────────┘  │ encode (reversed host)
//!                   └──────────┘                         ▼
//!                                                 ┌─────────────┐   /dump, shutdown
//!     GET /search ─▶ ┌──────────┐  prefix scan    │ SharedIndex │──────────────────▶ snapshot
//!                    │  search  │────────────────▶│   (trie)    │◀── load, seed file
//!     ◀── text/JSON ─│  engine  │  regex + rank   └─────────────┘
//!                    └──────────┘                        ▲
//!     GET /reset ────────────────────────────────────────┘ swap in empty trie
//!
//!     Cross-cutting: config (TOML + hot reload), observability (tracing,
//!     Prometheus), lifecycle (signals, graceful drain)
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use urlrank::config::validation::validate_config;
use urlrank::config::watcher::ConfigWatcher;
use urlrank::config::{load_config, ConfigError, ServiceConfig};
use urlrank::lifecycle::{signals, startup, Shutdown};
use urlrank::observability::{logging, metrics};
use urlrank::HttpServer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Action {
    /// Restore the index from the snapshot before serving.
    Load,
    /// Write a snapshot after the server drains on shutdown.
    DumpOnExit,
}

#[derive(Parser, Debug)]
#[command(name = "urlrank")]
#[command(about = "URL popularity index with prefix and regex search", long_about = None)]
struct Args {
    /// TOML configuration file; watched for live changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    action: Vec<Action>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if args.action.contains(&Action::Load) {
        config.snapshot.load_on_start = true;
    }
    if args.action.contains(&Action::DumpOnExit) {
        config.snapshot.dump_on_shutdown = true;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "urlrank starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        queue_capacity = config.ingest.queue_capacity,
        workers = config.ingest.workers,
        snapshot = %config.snapshot.path,
        request_timeout_secs = config.timeouts.request_secs,
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

    let index = startup::restore_index(&config);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::wait_for_signal(shutdown.clone()));

    // The watcher guard stops watching when dropped; the sender keeps the
    // update channel open when no file is watched.
    let (_watcher, _updates_tx, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(guard) => (Some(guard), None, rx),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    let (tx, rx) = mpsc::unbounded_channel();
                    (None, Some(tx), rx)
                }
            }
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (None, Some(tx), rx)
        }
    };

    let server = HttpServer::new(config, index);
    server
        .run(listener, config_updates, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
