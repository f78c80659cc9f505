//! Artifact store
//!
//! Validates, decodes, and persists base64-encoded images into one sandboxed
//! storage directory. Every persisted artifact gets a unique filename derived
//! from the capture timestamp and a kind tag, so piece and label artifacts
//! can never collide. References handed back to callers are re-validated for
//! path containment before bytes are ever served.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Artifact category, determines the filename tag and retrieval route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Per-piece inspection image, retained for audit and display
    Piece,
    /// Printed label for a completed batch
    Label,
}

impl ArtifactKind {
    /// Filename prefix. Label artifacts keep the original "etiqueta" tag
    /// expected by existing tooling on the line.
    pub fn tag(self) -> &'static str {
        match self {
            ArtifactKind::Piece => "piece",
            ArtifactKind::Label => "etiqueta",
        }
    }

    /// URL route prefix under which this artifact kind is served
    pub fn route(self) -> &'static str {
        match self {
            ArtifactKind::Piece => "/piece-image",
            ArtifactKind::Label => "/label-image",
        }
    }
}

/// Reference to a persisted artifact
#[derive(Debug, Clone)]
pub struct ArtifactRef {
    pub kind: ArtifactKind,
    pub filename: String,
    pub path: PathBuf,
}

impl ArtifactRef {
    /// Path as published to pollers, e.g. `/label-image/etiqueta_..._0.png`
    pub fn url_path(&self) -> String {
        format!("{}/{}", self.kind.route(), self.filename)
    }
}

/// Decode a base64 image payload, stripping an optional `data:*;base64,`
/// prefix first. Rejects syntactically invalid base64 and zero-byte decodes.
pub fn decode_image(raw: &str) -> Result<Vec<u8>> {
    let encoded = match raw.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => raw,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::InvalidPayload(format!("imagen base64 inválida ({e})")))?;
    if bytes.is_empty() {
        return Err(Error::InvalidPayload(
            "la imagen decodificada está vacía".to_string(),
        ));
    }
    Ok(bytes)
}

/// Persists decoded images under one sandboxed directory
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    /// Disambiguates filenames persisted within the same timestamp tick
    seq: AtomicU64,
}

impl ArtifactStore {
    /// Create a store rooted at `root`, creating the directory if absent
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            seq: AtomicU64::new(0),
        })
    }

    /// Decode `raw` and persist it under a unique timestamped filename
    pub fn persist(&self, kind: ArtifactKind, raw: &str) -> Result<ArtifactRef> {
        let bytes = decode_image(raw)?;
        self.persist_decoded(kind, &bytes)
    }

    /// Persist already-decoded image bytes
    pub fn persist_decoded(&self, kind: ArtifactKind, bytes: &[u8]) -> Result<ArtifactRef> {
        let filename = self.next_filename(kind);
        let path = self.root.join(&filename);
        std::fs::write(&path, bytes)?;
        debug!("Persisted {} artifact: {}", kind.tag(), path.display());
        Ok(ArtifactRef {
            kind,
            filename,
            path,
        })
    }

    /// Best-effort delete. A missing file is a no-op; other failures are
    /// logged and swallowed — artifact accumulation is an acceptable
    /// degraded state.
    pub fn delete(&self, artifact: &ArtifactRef) {
        match std::fs::remove_file(&artifact.path) {
            Ok(()) => debug!("Deleted artifact: {}", artifact.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to delete {}: {}", artifact.path.display(), e),
        }
    }

    /// Resolve a client-supplied filename to a path inside the sandbox.
    ///
    /// Only a bare filename (single normal path component) is accepted;
    /// separators, parent components, and absolute paths are rejected.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(filename)),
            _ => Err(Error::AccessDenied(format!(
                "invalid artifact name: {filename}"
            ))),
        }
    }

    fn next_filename(&self, kind: ArtifactKind) -> String {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{}.png", kind.tag(), stamp, seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (ArtifactStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_decode_plain_base64() {
        let bytes = decode_image(&STANDARD.encode(b"fake png bytes")).unwrap();
        assert_eq!(bytes, b"fake png bytes");
    }

    #[test]
    fn test_decode_data_uri() {
        let raw = format!("data:image/png;base64,{}", STANDARD.encode(b"pixels"));
        assert_eq!(decode_image(&raw).unwrap(), b"pixels");
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let err = decode_image("not!!valid@@base64").unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        assert!(matches!(
            decode_image("").unwrap_err(),
            Error::InvalidPayload(_)
        ));
        assert!(matches!(
            decode_image("data:image/png;base64,").unwrap_err(),
            Error::InvalidPayload(_)
        ));
    }

    #[test]
    fn test_persist_writes_unique_files() {
        let (store, _dir) = test_store();
        let raw = STANDARD.encode(b"img");

        let a = store.persist(ArtifactKind::Piece, &raw).unwrap();
        let b = store.persist(ArtifactKind::Piece, &raw).unwrap();

        assert_ne!(a.filename, b.filename);
        assert!(a.path.exists());
        assert!(b.path.exists());
        assert!(a.filename.starts_with("piece_"));
    }

    #[test]
    fn test_label_and_piece_tags_never_collide() {
        let (store, _dir) = test_store();
        let piece = store.persist_decoded(ArtifactKind::Piece, b"p").unwrap();
        let label = store.persist_decoded(ArtifactKind::Label, b"l").unwrap();
        assert!(piece.filename.starts_with("piece_"));
        assert!(label.filename.starts_with("etiqueta_"));
        assert_eq!(label.url_path(), format!("/label-image/{}", label.filename));
    }

    #[test]
    fn test_delete_missing_file_is_noop() {
        let (store, dir) = test_store();
        let ghost = ArtifactRef {
            kind: ArtifactKind::Piece,
            filename: "piece_gone.png".to_string(),
            path: dir.path().join("piece_gone.png"),
        };
        store.delete(&ghost);
    }

    #[test]
    fn test_delete_removes_file() {
        let (store, _dir) = test_store();
        let artifact = store.persist_decoded(ArtifactKind::Label, b"l").unwrap();
        assert!(artifact.path.exists());
        store.delete(&artifact);
        assert!(!artifact.path.exists());
    }

    #[test]
    fn test_resolve_accepts_bare_filename() {
        let (store, dir) = test_store();
        let path = store.resolve("piece_1.png").unwrap();
        assert_eq!(path, dir.path().join("piece_1.png"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let (store, _dir) = test_store();
        for candidate in ["../secret.png", "..", "a/b.png", "/etc/passwd", ""] {
            let err = store.resolve(candidate).unwrap_err();
            assert!(
                matches!(err, Error::AccessDenied(_)),
                "expected AccessDenied for {candidate:?}"
            );
        }
    }
}
