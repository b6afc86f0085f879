//! Multi-user blog server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ http server (request id, trace, timeout, limits)
//!                            │
//!                            ▼
//!                     blog context resolver ──▶ BlogDirectory
//!                            │ (404/500 on failure)
//!                            ▼
//!                      path dispatcher (PathTable: exact, then prefix)
//!                            │
//!                            ▼
//!                      content views ──▶ ContentStore
//!                            │
//!     Client Response        ▼
//!     ◀───────────────── JSON page / Atom feed / 404
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use blogd::config::{load_config, watcher::ConfigWatcher, BlogConfig};
use blogd::http::HttpServer;
use blogd::lifecycle::Shutdown;
use blogd::observability::{logging, metrics};
use blogd::store::MemoryStore;

#[derive(Parser)]
#[command(name = "blogd", version, about = "Multi-user blog server")]
struct Args {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON seed data for the in-memory store.
    #[arg(short, long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BlogConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("blogd v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        blogs_root = %config.paths.blogs_root,
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

    let store = Arc::new(match &args.seed {
        Some(path) => MemoryStore::load_from_file(path)?,
        None => MemoryStore::new(),
    });

    // Keep the watcher alive for the life of the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (rx, Some(watcher.run()?))
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store.clone(), store)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
