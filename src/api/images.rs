//! Artifact retrieval endpoints
//!
//! Serves persisted piece and label images back to the viewer. Filenames
//! come from the client, so every lookup re-validates path containment
//! before touching the filesystem.

use crate::error::{Error, Result};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

/// GET /piece-image/:filename
pub async fn get_piece_image(
    State(app): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    serve_artifact(&app, &filename).await
}

/// GET /label-image/:filename
pub async fn get_label_image(
    State(app): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    serve_artifact(&app, &filename).await
}

async fn serve_artifact(app: &AppState, filename: &str) -> Result<Response> {
    let path = app.store.resolve(filename)?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(format!("artifact {filename}")),
        _ => Error::Storage(e),
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}
