//! Published read model
//!
//! Maintains the single current `QcSnapshot` consumed by the polling viewer.
//! Writers replace the whole value as a side effect of aggregator
//! transitions; readers clone the most recently committed value and can
//! never observe a half-updated snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// Read model served to pollers.
///
/// Field names follow the viewer contract (camelCase JSON).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcSnapshot {
    /// Pass/fail of the most recent piece (`null` before the first report)
    pub is_ok: Option<bool>,
    /// When the most recent piece was observed
    pub timestamp: Option<DateTime<Utc>>,
    /// URL path of the most recent piece image
    pub current_piece_image_path: Option<String>,
    /// OK pieces counted toward the current batch
    pub current_pieces_ok: u32,
    /// URL path of the active printed label, while a completed batch is visible
    pub printed_label_path: Option<String>,
    /// When the active label was generated
    pub last_print_at: Option<DateTime<Utc>>,
    /// Cumulative accepted pieces (never reset)
    pub total_ok: u64,
    /// Cumulative rejected pieces (never reset)
    pub total_rejected: u64,
    /// Cumulative printed labels (never reset)
    pub total_labels: u64,
    /// Operator warning shown while OK pieces arrive without a queued label
    pub label_required_warning: Option<String>,
}

/// Owns the single current snapshot.
///
/// Uses RwLock for concurrent read access with serialized writes, so
/// pollers never block each other and never block on mutating requests
/// longer than one value replacement.
#[derive(Debug, Default)]
pub struct SnapshotPublisher {
    current: RwLock<QcSnapshot>,
}

impl SnapshotPublisher {
    /// Create a publisher holding the empty initial snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a new snapshot value, replacing the previous one wholesale
    pub async fn publish(&self, snapshot: QcSnapshot) {
        *self.current.write().await = snapshot;
    }

    /// Read the most recently committed snapshot
    pub async fn read(&self) -> QcSnapshot {
        self.current.read().await.clone()
    }
}
