//! Whole-file replacement.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use tokio::fs;

/// Write `contents` to `path` so that readers see either the previous file or
/// the complete new one, never a prefix.
///
/// The data goes to a uniquely named sibling first and is then renamed over
/// `path`; both live in the same directory, so the rename is atomic on the
/// same filesystem. Missing parent directories are created.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    replace(path, contents, None).await
}

/// Like [`write_atomic`], but the file appears with modification time
/// `modified` instead of the time of writing.
///
/// Derived files stamped with their input's mtime compare older than any
/// later edit of that input, including one made while they were produced.
pub async fn write_atomic_with_mtime(
    path: &Path,
    contents: &[u8],
    modified: SystemTime,
) -> io::Result<()> {
    replace(path, contents, Some(modified)).await
}

async fn replace(path: &Path, contents: &[u8], modified: Option<SystemTime>) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

    fs::create_dir_all(parent).await?;

    let temp_path = parent.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    ));

    let written = async {
        fs::write(&temp_path, contents).await?;
        if let Some(modified) = modified {
            let file = fs::OpenOptions::new()
                .write(true)
                .open(&temp_path)
                .await?
                .into_std()
                .await;
            file.set_modified(modified)?;
        }
        fs::rename(&temp_path, path).await
    }
    .await;

    if written.is_err() {
        let _ = fs::remove_file(&temp_path).await;
    }
    written
}
