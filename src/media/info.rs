//! Metadata reported by the extractor's JSON dump.

use serde::{Deserialize, Serialize};

/// Codec value the extractor uses for an absent stream.
const NO_CODEC: &str = "none";

/// Metadata of a single resolved video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Extractor-specific video identifier.
    pub id: String,

    /// Human readable title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Thumbnail image URL.
    #[serde(default)]
    pub thumbnail: Option<String>,

    /// Canonical page URL.
    #[serde(default)]
    pub webpage_url: Option<String>,

    /// All formats the extractor can produce.
    #[serde(default)]
    pub formats: Vec<MediaFormat>,
}

fn default_title() -> String {
    "No Title".to_owned()
}

impl VideoInfo {
    /// Parses the output of `yt-dlp --dump-single-json`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One downloadable format of a video.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFormat {
    /// Identifier accepted by the extractor's `-f` option.
    pub format_id: String,

    /// Container extension (`mp4`, `webm`, `m4a`, ...).
    #[serde(default)]
    pub ext: String,

    #[serde(default)]
    pub vcodec: Option<String>,

    #[serde(default)]
    pub acodec: Option<String>,

    /// Frame height in pixels, absent for audio-only formats.
    #[serde(default)]
    pub height: Option<u32>,

    /// Exact size in bytes when known.
    #[serde(default)]
    pub filesize: Option<u64>,

    /// Estimated size in bytes.
    #[serde(default)]
    pub filesize_approx: Option<u64>,
}

impl MediaFormat {
    /// Whether the format carries a video stream.
    ///
    /// Only an explicit `"none"` codec marks the stream as absent.
    #[must_use]
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some(NO_CODEC)
    }

    /// Whether the format carries an audio stream.
    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some(NO_CODEC)
    }

    /// Whether the video stream is explicitly absent.
    #[must_use]
    pub fn is_video_absent(&self) -> bool {
        self.vcodec.as_deref() == Some(NO_CODEC)
    }

    /// Best known size: exact when available, otherwise the estimate.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.filesize
            .filter(|&s| s > 0)
            .or(self.filesize_approx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "title": "Never Gonna Give You Up",
        "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
        "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "duration": 212,
        "formats": [
            {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "filesize": 3433514},
            {"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none", "height": 1080, "filesize_approx": 80000000},
            {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none", "height": 90}
        ]
    }"#;

    #[test]
    fn test_parse_extractor_dump() {
        let info = VideoInfo::from_json(SAMPLE).unwrap();
        assert_eq!(info.id, "dQw4w9WgXcQ");
        assert_eq!(info.title, "Never Gonna Give You Up");
        assert_eq!(info.formats.len(), 3);
        assert_eq!(info.formats[1].height, Some(1080));
        assert_eq!(info.formats[2].filesize, None);
    }

    #[test]
    fn test_missing_title_uses_placeholder() {
        let info = VideoInfo::from_json(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(info.title, "No Title");
        assert!(info.formats.is_empty());
        assert!(info.thumbnail.is_none());
    }

    #[test]
    fn test_null_fields_are_tolerated() {
        let info = VideoInfo::from_json(
            r#"{"id": "abc", "thumbnail": null, "formats": [{"format_id": "18", "ext": "mp4", "height": null, "filesize": null}]}"#,
        )
        .unwrap();
        assert_eq!(info.formats[0].height, None);
    }

    #[test]
    fn test_codec_presence() {
        let missing = MediaFormat::default();
        assert!(missing.has_video());
        assert!(missing.has_audio());
        assert!(!missing.is_video_absent());

        let audio_only = MediaFormat {
            vcodec: Some("none".to_owned()),
            acodec: Some("opus".to_owned()),
            ..MediaFormat::default()
        };
        assert!(!audio_only.has_video());
        assert!(audio_only.is_video_absent());
        assert!(audio_only.has_audio());
    }

    #[test]
    fn test_size_prefers_exact() {
        let format = MediaFormat {
            filesize: Some(10),
            filesize_approx: Some(20),
            ..MediaFormat::default()
        };
        assert_eq!(format.size(), Some(10));

        let approx_only = MediaFormat {
            filesize_approx: Some(20),
            ..MediaFormat::default()
        };
        assert_eq!(approx_only.size(), Some(20));
    }
}
