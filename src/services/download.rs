//! Saving downloaded archives
//!
//! Stands in for the browser's save-as: write the payload into the download
//! directory, never clobbering an existing file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A payload written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    /// Name suggested by the server (or the default)
    pub filename: String,
    /// Where it actually landed, possibly with a ` (n)` suffix
    pub path: PathBuf,
}

pub fn save_download(dir: &Path, filename: &str, bytes: &[u8]) -> io::Result<SavedDownload> {
    fs::create_dir_all(dir)?;
    let path = unique_path(dir, filename);
    fs::write(&path, bytes)?;
    log::info!("Saved {} bytes to {}", bytes.len(), path.display());

    Ok(SavedDownload {
        filename: filename.to_string(),
        path,
    })
}

/// `dir/name.ext`, or `dir/name (1).ext`, `dir/name (2).ext`... if taken
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(filename);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());
    let extension = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_download(dir.path(), "code.zip", b"PK\x03\x04").unwrap();

        assert_eq!(saved.filename, "code.zip");
        assert_eq!(saved.path, dir.path().join("code.zip"));
        assert_eq!(fs::read(&saved.path).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn test_save_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        save_download(dir.path(), "code.zip", b"first").unwrap();
        let second = save_download(dir.path(), "code.zip", b"second").unwrap();
        let third = save_download(dir.path(), "code.zip", b"third").unwrap();

        assert_eq!(second.path, dir.path().join("code (1).zip"));
        assert_eq!(third.path, dir.path().join("code (2).zip"));
        assert_eq!(fs::read(dir.path().join("code.zip")).unwrap(), b"first");
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("downloads").join("crud");
        let saved = save_download(&nested, "out", b"x").unwrap();
        assert_eq!(saved.path, nested.join("out"));
    }

    #[test]
    fn test_unique_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("archive"), b"").unwrap();
        assert_eq!(unique_path(dir.path(), "archive"), dir.path().join("archive (1)"));
    }
}
