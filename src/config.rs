//! qc-station configuration
//!
//! Resolved from command-line flags with environment variable fallbacks.

use clap::Parser;
use std::path::PathBuf;

/// Quality-control line monitor configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "qc-station", version, about = "Quality-control line monitor")]
pub struct Config {
    /// Port for the HTTP API
    #[arg(long, env = "QC_PORT", default_value_t = 3001)]
    pub port: u16,

    /// Sandboxed directory for piece and label artifacts (created if absent)
    #[arg(long, env = "QC_STORAGE_DIR", default_value = "qc-storage")]
    pub storage_dir: PathBuf,

    /// Base URL of the external signaling device
    #[arg(long, env = "QC_SIGNAL_URL", default_value = "http://192.168.1.100/led")]
    pub signal_url: String,
}
