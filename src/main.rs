//! qc-station - Quality-control line monitor service
//!
//! Receives per-piece inspection reports from the station camera, aggregates
//! them into labeled batches, and serves the latest state to the operator
//! dashboard.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use qc_station::config::Config;
use qc_station::notifier::{HttpSignalNotifier, SignalNotifier};
use qc_station::store::ArtifactStore;
use qc_station::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting QC line monitor (qc-station) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = Config::parse();

    let store = Arc::new(ArtifactStore::new(&config.storage_dir)?);
    info!("Artifact storage: {}", config.storage_dir.display());

    let notifier: Arc<dyn SignalNotifier> =
        Arc::new(HttpSignalNotifier::new(config.signal_url.as_str())?);
    info!("Signal device: {}", config.signal_url);

    let state = AppState::new(store, notifier);
    let app = build_router(state);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("qc-station listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
