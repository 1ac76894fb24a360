//! Compilation errors.

use std::io;
use std::sync::Arc;

use panview_storage::{StorageError, StorageErrorKind};

use crate::pandoc::RendererFailure;

/// Error compiling a document.
///
/// Cloneable so that concurrent requests for the same document can share
/// one outcome.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    /// The name escapes the source or output root.
    #[error("Path escapes root: {0}")]
    PathViolation(String),
    /// No source file matches the name.
    #[error("Document not found: {0}")]
    MissingInput(String),
    /// Pandoc failed; no artifact was written.
    #[error(transparent)]
    Renderer(#[from] RendererFailure),
    /// Filesystem error reading the source or writing the artifact.
    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),
}

impl CompileError {
    pub(crate) fn from_storage(err: &StorageError, name: &str) -> Self {
        match err.kind() {
            StorageErrorKind::PathViolation => Self::PathViolation(name.to_owned()),
            StorageErrorKind::NotFound => Self::MissingInput(name.to_owned()),
            _ => Self::Io(Arc::new(io::Error::other(err.to_string()))),
        }
    }

    /// Diagnostics to show the reader for a renderer failure.
    #[must_use]
    pub fn diagnostics(&self) -> String {
        match self {
            Self::Renderer(failure) => failure.message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pandoc::Stage;

    #[test]
    fn test_from_storage() {
        let err = CompileError::from_storage(&StorageError::path_violation("../x"), "../x");
        assert!(matches!(err, CompileError::PathViolation(ref n) if n == "../x"));

        let err = CompileError::from_storage(&StorageError::not_found("a"), "a");
        assert!(matches!(err, CompileError::MissingInput(_)));
    }

    #[test]
    fn test_renderer_diagnostics_are_verbatim() {
        let err = CompileError::from(RendererFailure {
            stage: Stage::Render,
            message: "Error at line 3\n".to_owned(),
        });
        assert_eq!(err.diagnostics(), "Error at line 3\n");
    }
}
