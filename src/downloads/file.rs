//! Staged media files.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::media::MediaKind;

/// A downloaded file that is deleted when dropped.
#[derive(Debug)]
pub struct MediaFile {
    path: PathBuf,
    kind: MediaKind,
    title: String,
}

impl MediaFile {
    /// Takes ownership of the file at `path`.
    #[must_use]
    pub fn new(path: PathBuf, kind: MediaKind, title: String) -> Self {
        Self { path, kind, title }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Title to attach on upload.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Drop for MediaFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Cleaned up file: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1_abc.mp4");
        std::fs::write(&path, b"data").unwrap();

        let file = MediaFile::new(path.clone(), MediaKind::Video, "Title".to_owned());
        assert_eq!(file.title(), "Title");
        assert!(file.path().exists());

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = MediaFile::new(dir.path().join("gone.m4a"), MediaKind::Audio, String::new());
        drop(file);
    }
}
