//! Choosing which formats to offer for a resolved video.

use std::collections::HashSet;
use std::fmt;

use super::VideoInfo;

/// Extensions accepted for the standalone audio option.
const AUDIO_EXTENSIONS: [&str; 3] = ["m4a", "webm", "mp3"];

/// Kind of media the user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Extension of the file the bot produces for this kind.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "m4a",
        }
    }

    /// Tag used in callback data.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Parses a callback data tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A download choice offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOption {
    pub kind: MediaKind,

    /// Size shown next to the label, if known.
    pub size: Option<u64>,

    /// Frame height for video, format id for audio.
    pub selector: String,
}

/// Builds the list of options for a video: one per distinct mp4 height
/// (tallest first), followed by at most one audio-only track.
#[must_use]
pub fn download_options(info: &VideoInfo) -> Vec<DownloadOption> {
    let mut video_formats: Vec<_> = info
        .formats
        .iter()
        .filter(|f| f.has_video() && f.ext == "mp4" && f.height.is_some_and(|h| h > 0))
        .collect();
    // Stable, so the first listed format wins among equal heights.
    video_formats.sort_by(|a, b| b.height.cmp(&a.height));

    let mut seen_heights = HashSet::new();
    let mut options: Vec<DownloadOption> = video_formats
        .into_iter()
        .filter_map(|f| {
            let height = f.height?;
            seen_heights.insert(height).then(|| DownloadOption {
                kind: MediaKind::Video,
                size: f.size(),
                selector: height.to_string(),
            })
        })
        .collect();

    // The extractor lists formats worst to best, so scan from the end.
    let best_audio = info.formats.iter().rev().find(|f| {
        f.has_audio() && f.is_video_absent() && AUDIO_EXTENSIONS.contains(&f.ext.as_str())
    });

    if let Some(audio) = best_audio {
        options.push(DownloadOption {
            kind: MediaKind::Audio,
            size: audio.size(),
            selector: audio.format_id.clone(),
        });
    }

    options
}

/// Format selector for a video capped at `height`, merging the best mp4
/// video with the best m4a audio and falling back to progressive formats.
#[must_use]
pub fn video_format_selector(height: &str) -> String {
    format!("bestvideo[height<={height}][ext=mp4]+bestaudio[ext=m4a]/best[height<={height}][ext=mp4]/best")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaFormat;

    fn video(id: &str, ext: &str, height: u32, size: Option<u64>) -> MediaFormat {
        MediaFormat {
            format_id: id.to_owned(),
            ext: ext.to_owned(),
            vcodec: Some("avc1".to_owned()),
            acodec: Some("none".to_owned()),
            height: Some(height),
            filesize: size,
            ..MediaFormat::default()
        }
    }

    fn audio(id: &str, ext: &str, size: Option<u64>) -> MediaFormat {
        MediaFormat {
            format_id: id.to_owned(),
            ext: ext.to_owned(),
            vcodec: Some("none".to_owned()),
            acodec: Some("opus".to_owned()),
            filesize: size,
            ..MediaFormat::default()
        }
    }

    fn info(formats: Vec<MediaFormat>) -> VideoInfo {
        VideoInfo {
            id: "abc".to_owned(),
            formats,
            ..VideoInfo::default()
        }
    }

    #[test]
    fn test_video_options_sorted_and_deduplicated() {
        let options = download_options(&info(vec![
            video("134", "mp4", 360, Some(1)),
            video("137", "mp4", 1080, Some(3)),
            video("136", "mp4", 720, Some(2)),
            video("22", "mp4", 720, Some(99)),
            video("248", "webm", 1080, Some(5)),
        ]));

        let selectors: Vec<_> = options.iter().map(|o| o.selector.as_str()).collect();
        assert_eq!(selectors, ["1080", "720", "360"]);
        // First listed 720p format supplies the size.
        assert_eq!(options[1].size, Some(2));
        assert!(options.iter().all(|o| o.kind == MediaKind::Video));
    }

    #[test]
    fn test_skips_formats_without_height_or_video() {
        let mut no_height = video("18", "mp4", 0, None);
        no_height.height = None;
        let zero_height = video("19", "mp4", 0, None);
        let mut no_video = video("20", "mp4", 480, None);
        no_video.vcodec = Some("none".to_owned());

        assert!(download_options(&info(vec![no_height, zero_height, no_video])).is_empty());
    }

    #[test]
    fn test_missing_vcodec_counts_as_video() {
        let mut format = video("18", "mp4", 360, None);
        format.vcodec = None;
        let options = download_options(&info(vec![format]));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_audio_option_is_last_matching_format() {
        let options = download_options(&info(vec![
            audio("139", "m4a", Some(1)),
            audio("251", "webm", Some(2)),
            audio("ogg1", "ogg", Some(3)),
            video("137", "mp4", 1080, None),
        ]));

        assert_eq!(options.len(), 2);
        let last = &options[1];
        assert_eq!(last.kind, MediaKind::Audio);
        assert_eq!(last.selector, "251");
        assert_eq!(last.size, Some(2));
    }

    #[test]
    fn test_audio_requires_known_absent_video() {
        let mut ambiguous = audio("140", "m4a", None);
        ambiguous.vcodec = None;
        assert!(download_options(&info(vec![ambiguous])).is_empty());
    }

    #[test]
    fn test_video_format_selector() {
        assert_eq!(
            video_format_selector("720"),
            "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best"
        );
    }

    #[test]
    fn test_media_kind_tags() {
        assert_eq!(MediaKind::from_tag("video"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_tag("audio"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_tag("gif"), None);
        assert_eq!(MediaKind::Audio.extension(), "m4a");
    }
}
