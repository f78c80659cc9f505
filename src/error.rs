//! Error types for qc-station
//!
//! Defines the service error taxonomy using thiserror and maps each variant
//! onto an HTTP status code at the API boundary. Notifier and artifact
//! deletion failures are deliberately absent: those are logged and swallowed
//! where they happen, never propagated.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for the qc-station service
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or undecodable client payload
    #[error("Payload inválido: {0}")]
    InvalidPayload(String),

    /// OK piece reported while no label is queued
    #[error("{0}")]
    PrecedenceViolation(String),

    /// Artifact retrieval attempted outside the storage sandbox
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Requested artifact does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O failure persisting or reading an artifact
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),
}

/// Convenience Result type using the qc-station Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Status code this error maps to at the HTTP boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidPayload(_) | Error::PrecedenceViolation(_) => StatusCode::BAD_REQUEST,
            Error::AccessDenied(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            Error::InvalidPayload("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::PrecedenceViolation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::AccessDenied("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(Error::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Storage(std::io::Error::other("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
