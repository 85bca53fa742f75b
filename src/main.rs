//! Cover Image Normalization Service
//!
//! Crops uploaded covers to 3:4, bounds their dimensions and re-encodes them
//! under a byte ceiling before storing them for a business record.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use coverfit::config::Config;
use coverfit::service::CoverService;
use coverfit::storage::{LocalObjectStore, SqliteRecordStore};
use coverfit::api::rest::{AppState, create_rest_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting Cover Normalization Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(Config::default_path()).unwrap_or_else(|e| {
        info!("Using default config ({})", e);
        Config::default()
    });

    info!("Configuration loaded:");
    info!("  Listen: {}:{}", config.server.host, config.server.port);
    info!("  Output format: {:?}", config.compression.format);
    info!(
        "  Bounds: {}x{}, ceiling {} KB, floor {}px",
        config.compression.max_width,
        config.compression.max_height,
        config.compression.max_size_kb,
        config.compression.min_dimension
    );
    info!("  Max input: {} bytes", config.limits.max_input_bytes);

    // Initialize storage
    let objects = Arc::new(
        LocalObjectStore::new(&config.storage.root, &config.storage.public_base_url)
            .context("Failed to initialize object store")?,
    );

    let sqlite_path = config
        .storage
        .sqlite_path
        .to_str()
        .context("SQLite path is not valid UTF-8")?;
    let records = Arc::new(
        SqliteRecordStore::new(sqlite_path)
            .await
            .context("Failed to initialize record store")?,
    );
    info!("SQLite record store initialized at: {}", sqlite_path);

    // Create cover service
    let service = Arc::new(
        CoverService::from_config(&config, objects.clone(), records)
            .context("Failed to create cover service")?,
    );

    let app_state = Arc::new(AppState {
        service,
        start_time: Instant::now(),
    });

    let public_mount = config
        .storage
        .serve_public
        .then(|| (config.storage.mount_path.as_str(), objects.root()));
    let rest_router = create_rest_router(app_state, public_mount);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("REST API listening on http://{}", addr);
    info!("Cover Normalization Service is ready!");

    axum::serve(listener, rest_router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, cleaning up...");
        })
        .await?;

    info!("Goodbye!");
    Ok(())
}
