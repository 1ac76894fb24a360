//! Storage error types.

use std::path::{Path, PathBuf};

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// No file matches the requested name.
    NotFound,
    /// The requested name escapes the configured root.
    PathViolation,
    /// Filesystem error while inspecting the candidate.
    Io,
}

/// Storage error with semantic kind, path context, and optional source.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    path: Option<PathBuf>,
    source: Option<std::io::Error>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a path violation error with path.
    #[must_use]
    pub fn path_violation(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::PathViolation).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            _ => StorageErrorKind::Io,
        };
        Self {
            kind,
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Path context, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the name escaped the configured root.
    #[must_use]
    pub fn is_path_violation(&self) -> bool {
        self.kind == StorageErrorKind::PathViolation
    }

    /// Whether no file matched.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PathViolation => "Path escapes root",
            StorageErrorKind::Io => "I/O error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_path() {
        let err = StorageError::path_violation("../secret");
        assert_eq!(err.to_string(), "Path escapes root (path: ../secret)");
        assert!(err.is_path_violation());
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err = StorageError::io(io, "notes/intro.md");
        assert!(err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_other_maps_to_io() {
        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = StorageError::io(io, "notes/intro.md");
        assert_eq!(err.kind(), StorageErrorKind::Io);
        assert_eq!(err.path(), Some(Path::new("notes/intro.md")));
    }
}
