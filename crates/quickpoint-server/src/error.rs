//! Error types for the HTTP server.

use std::path::PathBuf;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// File not found at the given path.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Only GET and HEAD are served.
    #[error("Unsupported method: {0}")]
    MethodNotImplemented(Method),

    /// Listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Blocking filesystem task failed.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            // the filesystem path stays in logs, not in the response
            Self::FileNotFound(_) => (StatusCode::NOT_FOUND, json!({"error": "File not found"})),
            Self::MethodNotImplemented(method) => (
                StatusCode::NOT_IMPLEMENTED,
                json!({"error": "Unsupported method", "method": method.as_str()}),
            ),
            Self::Bind { .. } | Self::Task(_) | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
