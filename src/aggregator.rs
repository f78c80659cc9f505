//! Batch aggregator
//!
//! The state machine at the heart of the monitor. Tracks the current batch's
//! OK count and the queued label, enforces the label-before-batch rule,
//! generates the printed label artifact when the batch threshold is reached,
//! and schedules the timed reset that clears the completed-batch view.
//!
//! All mutations are serialized behind one async mutex: a piece report or
//! label registration is fully applied before the next is considered.
//! Snapshot reads never take that mutex — they go through the
//! `SnapshotPublisher`, which holds the last committed view.

use crate::error::{Error, Result};
use crate::snapshot::{QcSnapshot, SnapshotPublisher};
use crate::store::{ArtifactKind, ArtifactRef, ArtifactStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// OK pieces required to complete a batch and print its label
pub const BATCH_THRESHOLD: u32 = 4;

/// How long the completed-batch state stays visible to pollers before the
/// automatic reset clears it. Presentation accommodation, not a business
/// rule; the triggering request never waits on it.
pub const BATCH_RESET_DELAY: Duration = Duration::from_secs(2);

const LABEL_REQUIRED_WARNING: &str = "Debe registrar una etiqueta antes de contar piezas OK.";

/// Mutable batch state. Every field is owned by the aggregator mutex; the
/// published snapshot is always a clone of `view` taken under the lock.
#[derive(Default)]
struct BatchState {
    view: QcSnapshot,
    /// Raw image queued for the next printed label; replaced wholesale on
    /// registration, consumed when its batch completes
    queued_label: Option<Vec<u8>>,
    /// Last printed label artifact, deleted when superseded or on reset
    active_label: Option<ArtifactRef>,
    /// Bumped on every transition that supersedes a pending reset timer
    epoch: u64,
}

struct AggregatorInner {
    state: Mutex<BatchState>,
    store: Arc<ArtifactStore>,
    snapshot: Arc<SnapshotPublisher>,
}

/// Cheap-to-clone handle on the serialized aggregation state
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<AggregatorInner>,
}

impl Aggregator {
    pub fn new(store: Arc<ArtifactStore>, snapshot: Arc<SnapshotPublisher>) -> Self {
        Self {
            inner: Arc::new(AggregatorInner {
                state: Mutex::new(BatchState::default()),
                store,
                snapshot,
            }),
        }
    }

    /// Register label artwork for the next batch.
    ///
    /// Unconditional batch restart from any state: progress, any previously
    /// queued label, the pending warning, and the visible completed-batch
    /// fields are all discarded. Also supersedes a pending reset timer.
    pub async fn register_label(&self, raw_image: Vec<u8>) {
        let mut state = self.inner.state.lock().await;

        state.epoch += 1;
        state.queued_label = Some(raw_image);
        state.view.current_pieces_ok = 0;
        state.view.label_required_warning = None;
        state.view.printed_label_path = None;
        state.view.last_print_at = None;

        info!("Label registered; batch restarted");
        self.inner.snapshot.publish(state.view.clone()).await;
    }

    /// Apply one inspection result.
    ///
    /// The piece image is persisted first; a payload or storage failure
    /// aborts the request with no counter mutated. After that the
    /// current-result fields and cumulative totals are always updated, even
    /// when the report fails with `PrecedenceViolation`.
    pub async fn report_piece(&self, passed: bool, raw_image: &str) -> Result<()> {
        let mut state = self.inner.state.lock().await;

        let piece = self.inner.store.persist(ArtifactKind::Piece, raw_image)?;

        let now = Utc::now();
        state.view.is_ok = Some(passed);
        state.view.timestamp = Some(now);
        state.view.current_piece_image_path = Some(piece.url_path());

        let outcome = if passed {
            self.apply_ok_piece(&mut state, now)
        } else {
            state.view.total_rejected += 1;
            Ok(())
        };

        self.inner.snapshot.publish(state.view.clone()).await;
        outcome
    }

    fn apply_ok_piece(&self, state: &mut BatchState, now: DateTime<Utc>) -> Result<()> {
        // Counted as physically accepted even when it cannot progress the
        // batch (see the precedence rule below).
        state.view.total_ok += 1;

        if state.queued_label.is_none() {
            state.view.label_required_warning = Some(LABEL_REQUIRED_WARNING.to_string());
            warn!("OK piece reported with no label queued");
            return Err(Error::PrecedenceViolation(LABEL_REQUIRED_WARNING.to_string()));
        }

        state.view.label_required_warning = None;
        if state.view.current_pieces_ok < BATCH_THRESHOLD {
            state.view.current_pieces_ok += 1;
        }

        if state.view.current_pieces_ok == BATCH_THRESHOLD {
            if let Some(raw) = state.queued_label.take() {
                self.print_label(state, &raw, now)?;
            }
        }

        Ok(())
    }

    /// Generate the printed-label artifact for the completed batch and
    /// schedule the timed reset of the completed-batch view.
    fn print_label(&self, state: &mut BatchState, raw: &[u8], now: DateTime<Utc>) -> Result<()> {
        if let Some(previous) = state.active_label.take() {
            self.inner.store.delete(&previous);
        }

        let label = self.inner.store.persist_decoded(ArtifactKind::Label, raw)?;

        state.view.total_labels += 1;
        state.view.printed_label_path = Some(label.url_path());
        state.view.last_print_at = Some(now);
        state.active_label = Some(label);
        state.epoch += 1;

        info!("Batch complete ({} OK pieces); label printed", BATCH_THRESHOLD);
        self.schedule_reset(state.epoch);
        Ok(())
    }

    /// Spawn the auto-reset timer for the batch identified by `epoch`. The
    /// epoch guard makes the timer a no-op if another transition (new label
    /// registration, next batch completion) supersedes it first.
    fn schedule_reset(&self, epoch: u64) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(BATCH_RESET_DELAY).await;
            inner.reset_if_current(epoch).await;
        });
    }
}

impl AggregatorInner {
    async fn reset_if_current(&self, epoch: u64) {
        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            return;
        }

        state.view.current_pieces_ok = 0;
        state.view.printed_label_path = None;
        state.view.last_print_at = None;
        state.queued_label = None;
        if let Some(label) = state.active_label.take() {
            self.store.delete(&label);
        }

        info!("Completed batch view cleared");
        self.snapshot.publish(state.view.clone()).await;
    }
}
