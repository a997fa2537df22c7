//! Download runner.
//!
//! Each download goes through the same steps:
//! 1. Wait for a free slot (bounded by `max_concurrent_downloads`)
//! 2. Prepare the staging directory and drop any stale file at the target path
//! 3. Run the backend download into `<dir>/<user>_<video>.<ext>`
//! 4. Hand the file to the caller as a [`MediaFile`]
//!
//! The guard is created before the backend runs, so partial output is
//! removed on every failure path.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::MediaFile;
use crate::media::{DownloadRequest, MediaBackend, MediaError};

/// Runs downloads against a [`MediaBackend`] with a concurrency limit.
pub struct DownloadRunner {
    /// Media backend performing the actual transfer.
    backend: Arc<dyn MediaBackend>,

    /// Staging directory for downloaded files.
    download_dir: PathBuf,

    /// Free download slots.
    permits: Semaphore,
}

impl DownloadRunner {
    /// Creates a runner allowing `max_concurrent` simultaneous downloads.
    #[must_use]
    pub fn new(backend: Arc<dyn MediaBackend>, download_dir: PathBuf, max_concurrent: usize) -> Self {
        Self {
            backend,
            download_dir,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// Target path for a user's download of a video.
    #[must_use]
    pub fn target_path(&self, user_id: i64, video_id: &str, request: &DownloadRequest) -> PathBuf {
        self.download_dir.join(format!(
            "{user_id}_{}.{}",
            sanitize_file_stem(video_id),
            request.kind.extension()
        ))
    }

    /// Downloads the request and returns the staged file.
    pub async fn run(
        &self,
        user_id: i64,
        video_id: &str,
        request: &DownloadRequest,
        title: String,
    ) -> Result<MediaFile, MediaError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| MediaError::Spawn(std::io::Error::other("download queue closed")))?;

        tokio::fs::create_dir_all(&self.download_dir).await?;

        let path = self.target_path(user_id, video_id, request);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed stale file: {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let file = MediaFile::new(path, request.kind, title);
        self.backend.download(request, file.path()).await?;

        info!("Downloaded {} to {}", request.kind, file.path().display());
        Ok(file)
    }

    /// Shared backend, for probing links.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn MediaBackend> {
        &self.backend
    }

    /// Number of currently free download slots.
    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }
}

impl std::fmt::Debug for DownloadRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRunner")
            .field("download_dir", &self.download_dir)
            .field("available_slots", &self.available_slots())
            .finish_non_exhaustive()
    }
}

/// Keeps a video id safe to use as part of a file name.
fn sanitize_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
