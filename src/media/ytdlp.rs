//! `yt-dlp` child-process backend.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{DownloadRequest, MediaBackend, MediaError, VideoInfo};

/// Runs the `yt-dlp` executable for metadata and downloads.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    timeout: Duration,
}

impl YtDlp {
    /// Creates a backend using the given executable and per-run timeout.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Arguments for a metadata-only probe.
    fn probe_args(url: &str) -> Vec<OsString> {
        [
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--",
            url,
        ]
        .into_iter()
        .map(OsString::from)
        .collect()
    }

    /// Arguments for downloading one format into `output`.
    fn download_args(request: &DownloadRequest, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-f".into(), request.format.as_str().into(), "-o".into()];
        args.push(output.as_os_str().to_owned());
        args.extend(
            [
                "--no-playlist",
                "--merge-output-format",
                "mp4",
                "--quiet",
                "--no-progress",
                "--no-warnings",
                "--",
                request.url.as_str(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args
    }

    /// Runs the extractor, failing on timeout or a non-zero exit status.
    async fn run(&self, args: Vec<OsString>) -> Result<Output, MediaError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| MediaError::Timeout(self.timeout))??;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Extractor exited with {}: {}", output.status, stderr.trim());
            Err(MediaError::classify(&stderr))
        }
    }
}

#[async_trait]
impl MediaBackend for YtDlp {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, MediaError> {
        debug!("Probing link: {}", url);
        let output = self.run(Self::probe_args(url)).await?;
        let info = VideoInfo::from_json(&String::from_utf8_lossy(&output.stdout))?;
        debug!("Probed [{}] with {} formats", info.id, info.formats.len());
        Ok(info)
    }

    async fn download(&self, request: &DownloadRequest, output: &Path) -> Result<(), MediaError> {
        info!(
            "Downloading {} from {} (format: {})",
            request.kind, request.url, request.format
        );
        self.run(Self::download_args(request, output)).await?;

        if tokio::fs::try_exists(output).await? {
            Ok(())
        } else {
            Err(MediaError::MissingOutput)
        }
    }
}
