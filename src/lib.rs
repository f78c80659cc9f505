//! qc-station library - Quality-control line monitor
//!
//! Aggregates per-piece inspection results from the line camera into labeled
//! batches: a label must be registered before OK pieces count toward the
//! batch, and once four OK pieces accumulate the queued label artwork is
//! persisted as the printed-label artifact. The latest state is published as
//! a single snapshot for the polling dashboard, and every outcome is
//! forwarded best-effort to the external signaling lamp.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod notifier;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};

use aggregator::Aggregator;
use notifier::SignalNotifier;
use snapshot::SnapshotPublisher;
use store::ArtifactStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub snapshot: Arc<SnapshotPublisher>,
    pub store: Arc<ArtifactStore>,
    pub notifier: Arc<dyn SignalNotifier>,
}

impl AppState {
    /// Create new application state wiring the aggregator, snapshot
    /// publisher, artifact store, and signal notifier together
    pub fn new(store: Arc<ArtifactStore>, notifier: Arc<dyn SignalNotifier>) -> Self {
        let snapshot = Arc::new(SnapshotPublisher::new());
        let aggregator = Aggregator::new(Arc::clone(&store), Arc::clone(&snapshot));
        Self {
            aggregator,
            snapshot,
            store,
            notifier,
        }
    }
}

/// Build application router
///
/// CORS is left permissive: the dashboard is served from a different origin
/// on the same host.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/qc-result", get(api::get_qc_result))
        .route("/piece", post(api::post_piece))
        .route("/label-image", post(api::post_label_image))
        .route("/piece-image/:filename", get(api::get_piece_image))
        .route("/label-image/:filename", get(api::get_label_image))
        .with_state(state)
        .layer(CorsLayer::permissive())
}
