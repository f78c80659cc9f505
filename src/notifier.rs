//! Signal notifier
//!
//! Best-effort forwarder that tells the external signaling device about each
//! inspection outcome. Delivery is fire-and-forget: the request path only
//! waits on dispatch, and failures are logged and swallowed. No retry, no
//! queue — a failed notification is simply lost.

use crate::error::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Dispatches a pass/fail signal to the external device.
///
/// Implementations must not block the caller; the aggregation pipeline never
/// depends on a notification outcome.
pub trait SignalNotifier: Send + Sync {
    fn notify(&self, passed: bool);
}

/// Production notifier: `GET <base_url>?color=green|red` on a spawned task
pub struct HttpSignalNotifier {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSignalNotifier {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::Http(format!("failed to create signal client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

impl SignalNotifier for HttpSignalNotifier {
    fn notify(&self, passed: bool) {
        let color = if passed { "green" } else { "red" };
        let url = format!("{}?color={}", self.base_url, color);
        let client = self.client.clone();

        tokio::spawn(async move {
            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Signal device notified (color={})", color);
                }
                Ok(response) => {
                    warn!(
                        "Signal device responded with status {}",
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("Could not reach signal device: {}", e);
                }
            }
        });
    }
}

/// No-op notifier for tests and headless operation
#[derive(Debug, Default)]
pub struct NoopSignalNotifier;

impl SignalNotifier for NoopSignalNotifier {
    fn notify(&self, _passed: bool) {}
}
