//! User-facing texts and formatting helpers.

use crate::media::{DownloadOption, MediaKind};

use super::BotCommand;

pub const PROCESSING: &str = "⏳ Processing link...";
pub const PREPARING_DOWNLOAD: &str = "⏳ Preparing download...";
pub const UPLOADING: &str = "🚀 Uploading to Telegram...";

pub const NO_FORMATS: &str = "Sorry, no suitable download formats were found.";
pub const UNAVAILABLE: &str = "❌ Failed: This video is private, has been deleted, or is unavailable.";
pub const INVALID_LINK: &str = "❌ This doesn't look like a valid link. Please try again.";
pub const UNSUPPORTED: &str = "❌ Failed to process the link. The video may be region-locked or unsupported.";
pub const UNEXPECTED: &str = "❌ An unexpected error occurred. Please try again later.";

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count as `"(1.5 MB)"`; unknown or zero sizes give `""`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn format_size(size: Option<u64>) -> String {
    let Some(bytes) = size.filter(|&b| b > 0) else {
        return String::new();
    };

    let mut exponent = 0;
    let mut unit: u64 = 1;
    while exponent < SIZE_UNITS.len() - 1 && bytes >= unit * 1024 {
        unit *= 1024;
        exponent += 1;
    }

    let scaled = bytes as f64 / unit as f64;
    let rounded = (scaled * 100.0).round_ties_even() / 100.0;

    // Whole numbers keep one decimal, like `512.0 B`.
    if rounded.fract() == 0.0 {
        format!("({rounded:.1} {})", SIZE_UNITS[exponent])
    } else {
        format!("({rounded} {})", SIZE_UNITS[exponent])
    }
}

/// Escapes text for Telegram's HTML formatting.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Welcome message with an inline mention of the user.
#[must_use]
pub fn greeting(user_id: i64, name: &str) -> String {
    let name = if name.trim().is_empty() { "there" } else { name.trim() };
    format!(
        "Hi <a href=\"tg://user?id={user_id}\">{}</a>! 👋 Send me a YouTube link to get started.",
        escape_html(name)
    )
}

/// Help message listing commands and usage.
#[must_use]
pub fn help_text() -> String {
    let mut lines = vec![
        "<b>How to use</b>".to_owned(),
        "Send a video link and pick a quality from the buttons. \
         🎬 buttons send an mp4 video, 🎵 sends the audio track."
            .to_owned(),
        String::new(),
        "<b>Commands</b>".to_owned(),
    ];
    lines.extend(
        BotCommand::all()
            .iter()
            .map(|cmd| format!("{cmd} - {}", cmd.description())),
    );
    lines.join("\n")
}

/// Bold caption for a format menu.
#[must_use]
pub fn menu_caption(title: &str) -> String {
    format!("<b>{}</b>", escape_html(title))
}

/// Button label for a download option.
#[must_use]
pub fn option_label(option: &DownloadOption) -> String {
    let size = format_size(option.size);
    let label = match option.kind {
        MediaKind::Video => format!("🎬 {}p {size}", option.selector),
        MediaKind::Audio => format!("🎵 Audio {size}"),
    };
    label.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(None), "");
        assert_eq!(format_size(Some(0)), "");
        assert_eq!(format_size(Some(512)), "(512.0 B)");
        assert_eq!(format_size(Some(1024)), "(1.0 KB)");
        assert_eq!(format_size(Some(1152)), "(1.12 KB)");
        assert_eq!(format_size(Some(1_572_864)), "(1.5 MB)");
        assert_eq!(format_size(Some(1_320_702_444)), "(1.23 GB)");
    }

    #[test]
    fn test_format_size_caps_at_gigabytes() {
        assert_eq!(format_size(Some(2 * 1024 * 1024 * 1024 * 1024)), "(2048.0 GB)");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & Jerry <3"), "Tom &amp; Jerry &lt;3");
        assert_eq!(escape_html("plain_title*[x]"), "plain_title*[x]");
    }

    #[test]
    fn test_greeting_mentions_user() {
        let text = greeting(42, "Ana <b>");
        assert!(text.starts_with("Hi <a href=\"tg://user?id=42\">Ana &lt;b&gt;</a>!"));
        assert!(greeting(1, "").contains(">there</a>"));
    }

    #[test]
    fn test_option_labels() {
        let video = DownloadOption {
            kind: MediaKind::Video,
            size: Some(1_572_864),
            selector: "720".to_owned(),
        };
        assert_eq!(option_label(&video), "🎬 720p (1.5 MB)");

        let audio = DownloadOption {
            kind: MediaKind::Audio,
            size: None,
            selector: "140".to_owned(),
        };
        assert_eq!(option_label(&audio), "🎵 Audio");
    }

    #[test]
    fn test_help_lists_commands() {
        let help = help_text();
        assert!(help.contains("/start"));
        assert!(help.contains("/help"));
    }
}
