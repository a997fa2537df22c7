//! Media extraction module.
//!
//! Wraps the external `yt-dlp` extractor: probing links for available
//! formats, choosing what to offer, and downloading the chosen stream.

mod error;
mod info;
mod selection;
mod ytdlp;

use std::path::Path;

use async_trait::async_trait;

pub use error::MediaError;
pub use info::{MediaFormat, VideoInfo};
pub use selection::{DownloadOption, MediaKind, download_options, video_format_selector};
pub use ytdlp::YtDlp;

/// A single download job handed to a [`MediaBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Page URL the extractor should resolve.
    pub url: String,

    /// Extractor format selector.
    pub format: String,

    /// Whether the output is a video or an audio track.
    pub kind: MediaKind,
}

/// Source of media metadata and downloads.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Resolves a link into its metadata and available formats.
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, MediaError>;

    /// Downloads the requested stream into `output`.
    async fn download(&self, request: &DownloadRequest, output: &Path) -> Result<(), MediaError>;
}
