//! HTTP API handlers for qc-station

pub mod health;
pub mod images;
pub mod qc;

pub use health::health_check;
pub use images::{get_label_image, get_piece_image};
pub use qc::{get_qc_result, post_label_image, post_piece};
