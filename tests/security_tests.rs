//! Security tests for qc-station
//!
//! Artifact filenames come straight from the client, so retrieval must stay
//! confined to the storage sandbox: traversal segments and absolute paths
//! yield 403, never filesystem access outside the storage directory.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::util::ServiceExt;

use qc_station::notifier::NoopSignalNotifier;
use qc_station::store::ArtifactStore;
use qc_station::{build_router, AppState};

fn setup_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ArtifactStore::new(dir.path()).unwrap());
    let state = AppState::new(store, Arc::new(NoopSignalNotifier));
    (build_router(state), dir)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// Path Containment
// =============================================================================

#[tokio::test]
async fn test_traversal_segments_are_rejected() {
    let (app, _dir) = setup_app();

    // %2e%2e%2f decodes to "../" in the path parameter.
    for uri in [
        "/piece-image/%2e%2e%2fsecret.png",
        "/piece-image/%2e%2e%2f%2e%2e%2fetc%2fpasswd",
        "/label-image/%2e%2e%2fsecret.png",
        "/piece-image/..",
    ] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "expected 403 for {uri}"
        );
    }
}

#[tokio::test]
async fn test_absolute_paths_are_rejected() {
    let (app, _dir) = setup_app();

    let response = app
        .oneshot(get_request("/label-image/%2fetc%2fpasswd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_traversal_cannot_read_file_outside_sandbox() {
    let parent = tempfile::tempdir().unwrap();
    let storage = parent.path().join("storage");
    std::fs::write(parent.path().join("outside.png"), b"outside the sandbox").unwrap();

    let store = Arc::new(ArtifactStore::new(&storage).unwrap());
    let state = AppState::new(store, Arc::new(NoopSignalNotifier));
    let app = build_router(state);

    let response = app
        .oneshot(get_request("/piece-image/%2e%2e%2foutside.png"))
        .await
        .unwrap();

    // The sibling file exists, but containment rejects the name before any
    // filesystem access.
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_contained_unknown_name_is_404_not_403() {
    let (app, _dir) = setup_app();

    let response = app
        .oneshot(get_request("/piece-image/piece_nonexistent.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
