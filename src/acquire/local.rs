//! Local `.sketch` file resolution.

use std::path::{Path, PathBuf};

use crate::sketch::error::{SketchError, SketchResult};

/// Whether `location` names an absolute filesystem path.
///
/// Accepts POSIX roots (`/...`) and Windows drive paths (`C:\...`) regardless
/// of the host platform.
#[must_use]
pub fn is_absolute_location(location: &str) -> bool {
    location.starts_with('/') || location.contains(":\\") || Path::new(location).is_absolute()
}

/// Resolves the file to read for `location`.
///
/// Absolute locations are used as-is; anything else falls back to
/// `default_file`.
///
/// # Errors
///
/// Returns [`SketchError::MissingLocalFile`] if `location` is not absolute and
/// there is no default.
pub fn resolve_path(location: &str, default_file: Option<&Path>) -> SketchResult<PathBuf> {
    if is_absolute_location(location) {
        return Ok(PathBuf::from(location));
    }
    default_file
        .map(Path::to_path_buf)
        .ok_or(SketchError::MissingLocalFile)
}

/// Reads the resolved file for `location`.
///
/// # Errors
///
/// - [`SketchError::MissingLocalFile`] if no path can be resolved
/// - [`SketchError::FileNotFound`] if the resolved path does not exist
/// - [`SketchError::FileRead`] if existence cannot be determined or reading
///   fails
pub async fn read(location: &str, default_file: Option<&Path>) -> SketchResult<Vec<u8>> {
    let path = resolve_path(location, default_file)?;

    match tokio::fs::try_exists(&path).await {
        Ok(true) => {}
        Ok(false) => return Err(SketchError::FileNotFound { path }),
        Err(e) => return Err(SketchError::file_read(&path, e)),
    }

    tracing::debug!(path = %path.display(), "Reading local Sketch file");

    tokio::fs::read(&path)
        .await
        .map_err(|e| SketchError::file_read(&path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_locations() {
        assert!(is_absolute_location("/designs/app.sketch"));
        assert!(is_absolute_location("C:\\designs\\app.sketch"));
        assert!(!is_absolute_location("designs/app.sketch"));
        assert!(!is_absolute_location("https://example.com/app.sketch"));
    }

    #[test]
    fn relative_location_uses_default() {
        let default = Path::new("/srv/default.sketch");
        assert_eq!(
            resolve_path("whatever", Some(default)).unwrap(),
            PathBuf::from("/srv/default.sketch")
        );
        assert_eq!(
            resolve_path("/a/b.sketch", Some(default)).unwrap(),
            PathBuf::from("/a/b.sketch")
        );
    }

    #[test]
    fn relative_location_without_default_fails() {
        let err = resolve_path("app.sketch", None).unwrap_err();
        assert!(matches!(err, SketchError::MissingLocalFile));
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sketch");

        let err = read(path.to_str().unwrap(), None).await.unwrap_err();
        assert!(matches!(err, SketchError::FileNotFound { path: ref p } if *p == path));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_location_is_a_read_error() {
        // A regular file used as a directory: the lookup fails with ENOTDIR,
        // which says nothing about whether the target exists.
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let path = file.join("doc.sketch");

        let err = read(path.to_str().unwrap(), None).await.unwrap_err();
        assert!(matches!(err, SketchError::FileRead { .. }));
    }

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.sketch");
        std::fs::write(&path, b"bytes").unwrap();

        let bytes = read("relative-name", Some(&path)).await.unwrap();
        assert_eq!(bytes, b"bytes");
    }
}
