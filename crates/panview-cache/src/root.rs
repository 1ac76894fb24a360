//! Cache root directory.
//!
//! A persistent root validates a `VERSION` file on construction. If the
//! version mismatches or is missing, the whole directory is wiped and
//! recreated, so artifacts produced by a different build are never served.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Root directory shared by the document and diagram caches.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION                       # persistent roots only
/// +-- includes/{variant}/*.html     # pandoc header/before/after includes
/// +-- generated/{digest}.{fmt}.png  # diagram images
/// +-- notes/intro.std.html          # compiled documents
/// ```
#[derive(Debug)]
pub struct CacheRoot {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl CacheRoot {
    /// Create a process-scoped root in the system temp directory.
    ///
    /// The directory is removed by [`close`](Self::close) or, failing that,
    /// when the value is dropped.
    pub fn temporary() -> io::Result<Self> {
        let temp = tempfile::Builder::new().prefix("panview-").tempdir()?;
        let path = temp.path().canonicalize()?;
        tracing::debug!(path = %path.display(), "Created temporary cache root");
        Ok(Self {
            path,
            temp: Some(temp),
        })
    }

    /// Open a persistent root at `root`, validating the cache version.
    pub fn persistent(root: &Path, version: &str) -> io::Result<Self> {
        validate_version(root, version);
        fs::create_dir_all(root)?;
        Ok(Self {
            path: root.canonicalize()?,
            temp: None,
        })
    }

    /// Canonical path of the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the root is removed on shutdown.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Tear the root down, reporting removal errors.
    ///
    /// Persistent roots are left in place.
    pub fn close(self) -> io::Result<()> {
        match self.temp {
            Some(temp) => {
                tracing::debug!(path = %self.path.display(), "Removing temporary cache root");
                temp.close()
            }
            None => Ok(()),
        }
    }
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}
