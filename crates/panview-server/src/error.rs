//! Server error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use panview_site::CompileError;
use panview_storage::{StorageError, StorageErrorKind};

/// Request-level error, rendered as a plain-text response.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The requested name escapes a configured root.
    #[error("Forbidden: {0}")]
    PathViolation(String),

    /// The `fmt` query parameter names no variant.
    #[error("Unknown format: {0}")]
    UnknownFormatVariant(String),

    /// No document or file matches the request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Pandoc failed; carries its diagnostics verbatim.
    #[error("{0}")]
    Renderer(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ServerError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PathViolation(_) => StatusCode::FORBIDDEN,
            Self::UnknownFormatVariant(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Renderer(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CompileError> for ServerError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::PathViolation(name) => Self::PathViolation(name),
            CompileError::MissingInput(name) => Self::NotFound(name),
            CompileError::Renderer(failure) => Self::Renderer(failure.message),
            CompileError::Io(e) => Self::Io(e.to_string()),
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match err.kind() {
            StorageErrorKind::PathViolation => Self::PathViolation(path),
            StorageErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io(err.to_string()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
