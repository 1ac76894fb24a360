//! Staleness checks behind the autorefresh endpoint.

use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use panview_storage::{PathResolver, StorageError, modified};

/// Whether the document `name` changed relative to a reference point.
///
/// With `since` (Unix seconds, the time the client loaded the page): true iff
/// the source was modified after it. Without: true iff the artifact at
/// `artifact` is missing or older than the source. A missing source is never
/// stale.
pub fn is_stale(
    sources: &PathResolver,
    name: &str,
    artifact: &Path,
    since: Option<u64>,
) -> Result<bool, StorageError> {
    let source_modified = sources.mod_time(name)?;

    if let Some(since) = since {
        let since = UNIX_EPOCH + Duration::from_secs(since);
        return Ok(source_modified > since);
    }

    if source_modified == UNIX_EPOCH {
        return Ok(false);
    }
    match modified(artifact).map_err(|e| StorageError::io(e, artifact))? {
        Some(artifact_modified) => Ok(artifact_modified < source_modified),
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn fixture() -> (TempDir, PathResolver) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("docs/notes")).unwrap();
        fs::write(tmp.path().join("docs/notes/intro.md"), "# Intro").unwrap();
        set_mtime(
            &tmp.path().join("docs/notes/intro.md"),
            UNIX_EPOCH + Duration::from_secs(1_000_000),
        );
        let resolver = PathResolver::new(&tmp.path().join("docs"), vec![".md".to_owned()]).unwrap();
        (tmp, resolver)
    }

    #[test]
    fn test_missing_source_is_never_stale() {
        let (tmp, resolver) = fixture();
        let artifact = tmp.path().join("absent.std.html");
        assert!(!is_stale(&resolver, "absent", &artifact, None).unwrap());
        assert!(!is_stale(&resolver, "absent", &artifact, Some(0)).unwrap());
    }

    #[test]
    fn test_missing_artifact_is_stale() {
        let (tmp, resolver) = fixture();
        let artifact = tmp.path().join("intro.std.html");
        assert!(is_stale(&resolver, "notes/intro", &artifact, None).unwrap());
    }

    #[test]
    fn test_artifact_age() {
        let (tmp, resolver) = fixture();
        let artifact = tmp.path().join("intro.std.html");
        fs::write(&artifact, "<html>").unwrap();

        set_mtime(&artifact, UNIX_EPOCH + Duration::from_secs(999_999));
        assert!(is_stale(&resolver, "notes/intro", &artifact, None).unwrap());

        set_mtime(&artifact, UNIX_EPOCH + Duration::from_secs(1_000_000));
        assert!(!is_stale(&resolver, "notes/intro", &artifact, None).unwrap());
    }

    #[test]
    fn test_client_timestamp() {
        let (tmp, resolver) = fixture();
        let artifact = tmp.path().join("unused");
        assert!(is_stale(&resolver, "notes/intro", &artifact, Some(999_999)).unwrap());
        assert!(!is_stale(&resolver, "notes/intro", &artifact, Some(1_000_000)).unwrap());
        assert!(!is_stale(&resolver, "notes/intro", &artifact, Some(1_000_001)).unwrap());
    }

    #[test]
    fn test_path_violation_propagates() {
        let (tmp, resolver) = fixture();
        let err = is_stale(&resolver, "../x", &tmp.path().join("x"), None).unwrap_err();
        assert!(err.is_path_violation());
    }
}
