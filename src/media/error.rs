//! Errors reported while probing or downloading media.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the extractor.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Video is private, deleted or unavailable: {0}")]
    Unavailable(String),

    #[error("Not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("Extractor failed: {0}")]
    Unsupported(String),

    #[error("Failed to run extractor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Failed to parse extractor output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Extractor did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Extractor reported success but produced no file")]
    MissingOutput,
}

impl MediaError {
    /// Classifies an extractor failure from its error output.
    #[must_use]
    pub fn classify(stderr: &str) -> Self {
        let detail = last_error_line(stderr);
        let lowered = stderr.to_lowercase();

        if lowered.contains("video unavailable") || lowered.contains("private video") {
            Self::Unavailable(detail)
        } else if lowered.contains("is not a valid url") {
            Self::InvalidUrl(detail)
        } else {
            Self::Unsupported(detail)
        }
    }

    /// Whether the extractor itself rejected the request, as opposed to
    /// the bot failing to run it.
    #[must_use]
    pub const fn is_extractor_failure(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::InvalidUrl(_) | Self::Unsupported(_)
        )
    }
}

/// Picks the most relevant line of the extractor's error output.
fn last_error_line(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map_or_else(|| "no error output".to_owned(), |l| (*l).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unavailable() {
        let err = MediaError::classify("ERROR: [youtube] abc: Video unavailable. This video has been removed");
        assert!(matches!(err, MediaError::Unavailable(_)));

        let err = MediaError::classify("ERROR: [youtube] abc: Private video. Sign in if you've been granted access");
        assert!(matches!(err, MediaError::Unavailable(_)));
    }

    #[test]
    fn test_classify_invalid_url() {
        let err = MediaError::classify("ERROR: [generic] 'hello there' is not a valid URL.");
        assert!(matches!(err, MediaError::InvalidUrl(_)));
    }

    #[test]
    fn test_classify_other() {
        let err = MediaError::classify("ERROR: [youtube] abc: The uploader has not made this video available in your country");
        assert!(matches!(err, MediaError::Unsupported(_)));
        assert!(err.is_extractor_failure());
    }

    #[test]
    fn test_detail_prefers_error_lines() {
        let stderr = "WARNING: something odd\nERROR: first\nERROR: second\n\n";
        assert_eq!(last_error_line(stderr), "ERROR: second");
        assert_eq!(last_error_line("plain failure\n"), "plain failure");
        assert_eq!(last_error_line(""), "no error output");
    }

    #[test]
    fn test_runtime_errors_are_not_extractor_failures() {
        assert!(!MediaError::Timeout(Duration::from_secs(5)).is_extractor_failure());
        assert!(!MediaError::MissingOutput.is_extractor_failure());
    }

    #[test]
    fn test_timeout_message_keeps_subsecond_precision() {
        let err = MediaError::Timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "Extractor did not finish within 500ms");
    }
}
