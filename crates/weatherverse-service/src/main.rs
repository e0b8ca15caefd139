//! WeatherVerse Service - HTTP ingest and query API.
//!
//! Run with: `cargo run -p weatherverse-service`

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use weatherverse_service::{AppState, Config};
use weatherverse_store::{Store, StoreKind};

/// WeatherVerse Service - HTTP ingest and query API.
#[derive(Parser, Debug)]
#[command(name = "weatherverse-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Store mode: `latest` or `history` (overrides config).
    #[arg(short, long)]
    mode: Option<StoreKind>,

    /// Number of readings kept in history mode (overrides config).
    #[arg(long)]
    history_capacity: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("weatherverse_service=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // Override config with CLI args
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(mode) = args.mode {
        config.store.mode = mode;
    }
    if let Some(capacity) = args.history_capacity {
        config.store.history_capacity = capacity;
    }
    config.validate()?;

    let mode = config.store.store_mode()?;
    info!(
        "Using {} store (capacity {})",
        mode.kind(),
        mode.capacity()
    );
    let store = Store::new(mode)?;

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str()).await?;
    let state = AppState::new(store, config);
    let app = weatherverse_service::app(state);

    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped; in-memory readings discarded");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
