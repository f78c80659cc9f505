//! Inspection ingestion and read-model endpoints
//!
//! Thin translation layer over the aggregator. Request bodies are validated
//! field by field so type errors come back as 400 with an operator-readable
//! message, matching the contract the station firmware already speaks.

use crate::error::{Error, Result};
use crate::snapshot::QcSnapshot;
use crate::store;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tracing::info;

/// GET /qc-result
///
/// Current snapshot for the polling viewer, 200 always.
pub async fn get_qc_result(State(app): State<AppState>) -> Json<QcSnapshot> {
    Json(app.snapshot.read().await)
}

/// POST /piece
///
/// Body `{image: base64 string, isOk: boolean}`. Persists the piece image,
/// applies the batch rules, and signals the external device with the
/// outcome. 204 on success; 400 on a malformed payload or a precedence
/// violation; 500 when the image cannot be persisted.
pub async fn post_piece(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<StatusCode> {
    let image = body
        .get("image")
        .and_then(Value::as_str)
        .ok_or_else(payload_error)?;
    let is_ok = body
        .get("isOk")
        .and_then(Value::as_bool)
        .ok_or_else(payload_error)?;

    let result = app.aggregator.report_piece(is_ok, image).await;

    // The lamp reflects every recorded outcome, including precedence
    // violations; a storage failure recorded nothing, so it signals nothing.
    match &result {
        Ok(()) | Err(Error::PrecedenceViolation(_)) => app.notifier.notify(is_ok),
        Err(_) => {}
    }
    result?;

    info!("Piece result recorded (isOk={})", is_ok);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /label-image
///
/// Body `{image: base64 string}`. Registers label artwork for the next
/// batch; always a fresh batch start. 204 on success, 400 on a malformed
/// payload.
pub async fn post_label_image(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<StatusCode> {
    let image = body
        .get("image")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidPayload("se espera image (string base64)".to_string()))?;

    let bytes = store::decode_image(image)?;
    app.aggregator.register_label(bytes).await;

    Ok(StatusCode::NO_CONTENT)
}

fn payload_error() -> Error {
    Error::InvalidPayload("se espera image (string base64) e isOk (boolean)".to_string())
}
