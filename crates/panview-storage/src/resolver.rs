//! Logical name → file resolution with root containment.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StorageError;

/// A source file located for one request. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Filesystem modification time.
    pub modified: SystemTime,
}

/// How a request for a logical name should be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Resolves to a file with a source extension; compile it.
    Compilable,
    /// Anything else, including names that do not resolve; serve as-is.
    StaticAsset,
}

/// Resolves names relative to a root directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    extensions: Vec<String>,
}

impl PathResolver {
    /// Create a resolver for `root`.
    ///
    /// `extensions` (with leading dot) are tried in order after the literal
    /// name; pass an empty list for roots that hold no sources.
    pub fn new(root: &Path, extensions: Vec<String>) -> Result<Self, StorageError> {
        let root = root
            .canonicalize()
            .map_err(|e| StorageError::io(e, root))?;
        Ok(Self { root, extensions })
    }

    /// Canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source extensions in priority order.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Map `relative` to a path under the root.
    ///
    /// The check is lexical first, so `..` escapes and absolute names fail
    /// even when the target does not exist. Existing targets are then
    /// canonicalized so a symlink cannot lead outside the root either.
    pub fn contain(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let normalized =
            normalize(relative).ok_or_else(|| StorageError::path_violation(relative))?;
        let joined = self.root.join(normalized);

        match joined.canonicalize() {
            Ok(canonical) if !canonical.starts_with(&self.root) => {
                tracing::warn!(name = relative, target = %canonical.display(), "Symlink escapes root");
                Err(StorageError::path_violation(relative))
            }
            _ => Ok(joined),
        }
    }

    /// Locate the source file for `name`.
    ///
    /// Tries the literal name, then `name` + each extension; the first
    /// regular file wins.
    pub fn resolve(&self, name: &str) -> Result<ResolvedSource, StorageError> {
        let candidates = std::iter::once(name.to_owned())
            .chain(self.extensions.iter().map(|ext| format!("{name}{ext}")));

        for candidate in candidates {
            let path = self.contain(&candidate)?;
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {
                    let modified = meta.modified().map_err(|e| StorageError::io(e, &path))?;
                    return Ok(ResolvedSource { path, modified });
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::io(e, path)),
            }
        }

        Err(StorageError::not_found(name))
    }

    /// Decide whether `name` is compiled or served as a static asset.
    ///
    /// Names that do not resolve are static assets; the static handler
    /// reports them as not found. Path violations still fail.
    pub fn classify(&self, name: &str) -> Result<SourceKind, StorageError> {
        match self.resolve(name) {
            Ok(source) if self.is_source(&source.path) => Ok(SourceKind::Compilable),
            Ok(_) => Ok(SourceKind::StaticAsset),
            Err(e) if e.is_not_found() => Ok(SourceKind::StaticAsset),
            Err(e) => Err(e),
        }
    }

    /// Modification time of `name`'s source, or the epoch if it has none.
    pub fn mod_time(&self, name: &str) -> Result<SystemTime, StorageError> {
        match self.resolve(name) {
            Ok(source) => Ok(source.modified),
            Err(e) if e.is_not_found() => Ok(UNIX_EPOCH),
            Err(e) => Err(e),
        }
    }

    /// Whether `path` ends in one of the source extensions.
    #[must_use]
    pub fn is_source(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|ext| file_name.len() > ext.len() && file_name.ends_with(ext.as_str()))
    }
}

/// Modification time of `path`, or `None` if it does not exist.
pub fn modified(path: &Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Lexically normalize a relative name. `None` if it climbs above its start
/// or is absolute.
fn normalize(relative: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
