//! Command and callback types.

use std::fmt;

use crate::media::{DownloadOption, MediaKind};

/// Telegram's limit on inline button callback data.
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Available bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Greet the user.
    Start,

    /// Show help information.
    Help,
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Accepts an optional `@botname` suffix, which must name this bot when
    /// its username is known. Returns `None` for unknown commands and for
    /// commands addressed to other bots.
    #[must_use]
    pub fn parse(text: &str, own_username: Option<&str>) -> Option<Self> {
        let word = text.split_whitespace().next()?.strip_prefix('/')?;
        let (name, target) = match word.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (word, None),
        };

        if let (Some(target), Some(own)) = (target, own_username) {
            if !target.eq_ignore_ascii_case(own) {
                return None;
            }
        }

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Returns the command name as it appears in the bot menu.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
        }
    }

    /// Returns the command description for the bot menu.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Start => "Say hello and get started",
            Self::Help => "Show how to use the bot",
        }
    }

    /// Returns all available commands.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Start, Self::Help]
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// Classification of an incoming text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A known command.
    Command(BotCommand),

    /// Plain text, treated as a link to resolve.
    Link(String),

    /// Empty text or an unknown command.
    Ignored,
}

impl Incoming {
    /// Classifies message text for a bot with the given username.
    #[must_use]
    pub fn classify(text: &str, own_username: Option<&str>) -> Self {
        let text = text.trim();

        if text.is_empty() {
            Self::Ignored
        } else if text.starts_with('/') {
            BotCommand::parse(text, own_username).map_or(Self::Ignored, Self::Command)
        } else {
            Self::Link(text.to_owned())
        }
    }

    /// Classifies a whole message. Media messages carry their caption as
    /// text, so only plain text messages count as links or commands.
    #[must_use]
    pub fn classify_message(text: &str, has_media: bool, own_username: Option<&str>) -> Self {
        if has_media {
            Self::Ignored
        } else {
            Self::classify(text, own_username)
        }
    }
}

/// Action encoded in a format menu button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAction {
    pub kind: MediaKind,
    pub video_id: String,

    /// Height for video, format id for audio.
    pub selector: String,
}

impl CallbackAction {
    /// Builds the action for a menu option of a video.
    #[must_use]
    pub fn for_option(video_id: &str, option: &DownloadOption) -> Self {
        Self {
            kind: option.kind,
            video_id: video_id.to_owned(),
            selector: option.selector.clone(),
        }
    }

    /// Encodes as `<kind>:<video id>:<selector>`.
    ///
    /// Returns `None` if the result would not fit in callback data.
    #[must_use]
    pub fn encode(&self) -> Option<String> {
        if self.video_id.contains(':') || self.selector.contains(':') {
            return None;
        }
        let data = format!("{}:{}:{}", self.kind.tag(), self.video_id, self.selector);
        (data.len() <= MAX_CALLBACK_DATA_LEN).then_some(data)
    }

    /// Parses callback data produced by [`encode`](Self::encode).
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(':');
        let kind = MediaKind::from_tag(parts.next()?)?;
        let video_id = parts.next().filter(|s| !s.is_empty())?.to_owned();
        let selector = parts.next().filter(|s| !s.is_empty())?.to_owned();

        if parts.next().is_some() {
            return None;
        }
        if kind == MediaKind::Video && selector.parse::<u32>().is_err() {
            return None;
        }

        Some(Self {
            kind,
            video_id,
            selector,
        })
    }
}

/// One inline button of the format menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub data: String,
}

/// Format selection menu for a resolved link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatMenu {
    /// Bold, escaped title in HTML.
    pub caption_html: String,

    /// Thumbnail image URL, shown as a photo when present.
    pub thumbnail: Option<String>,

    /// Buttons, one per row.
    pub buttons: Vec<MenuButton>,
}

/// Result of resolving a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Formats were found.
    Menu(FormatMenu),

    /// Nothing to offer; the text replaces the status message.
    Failed(&'static str),
}

/// Why a button press did not produce a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFailure {
    /// The button data is malformed or no longer understood.
    Expired,

    /// The extractor rejected the download.
    Download,

    /// Anything else went wrong.
    Unexpected,
}

impl DownloadFailure {
    /// User-facing message in HTML.
    #[must_use]
    pub const fn message_html(self) -> &'static str {
        match self {
            Self::Expired => "⌛ <b>This button has expired</b>\n\nPlease send the link again.",
            Self::Download => {
                "❌ <b>Download Failed</b>\n\nThis could be due to a YouTube error or a protected video."
            }
            Self::Unexpected => "❌ <b>An Unexpected Error Occurred</b>\n\nPlease try again later.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(BotCommand::parse("/start", None), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/START", None), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/start@media_bot", None), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("  /help me", None), Some(BotCommand::Help));
        assert_eq!(BotCommand::parse("/h", None), None);
        assert_eq!(BotCommand::parse("/settings", None), None);
        assert_eq!(BotCommand::parse("start", None), None);
    }

    #[test]
    fn test_parse_commands_for_other_bots() {
        let own = Some("media_bot");
        assert_eq!(BotCommand::parse("/start@media_bot", own), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/start@Media_Bot", own), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/start@SomeOtherBot", own), None);
        assert_eq!(BotCommand::parse("/help", own), Some(BotCommand::Help));
    }

    #[test]
    fn test_classify_incoming() {
        assert_eq!(Incoming::classify("/start", None), Incoming::Command(BotCommand::Start));
        assert_eq!(Incoming::classify("/unknown", None), Incoming::Ignored);
        assert_eq!(Incoming::classify("/start@SomeOtherBot", Some("media_bot")), Incoming::Ignored);
        assert_eq!(Incoming::classify("   ", None), Incoming::Ignored);
        assert_eq!(
            Incoming::classify(" https://youtu.be/abc \n", None),
            Incoming::Link("https://youtu.be/abc".to_owned())
        );
    }

    #[test]
    fn test_captions_on_media_are_ignored() {
        let caption = "https://youtu.be/abc";
        assert_eq!(
            Incoming::classify_message(caption, false, None),
            Incoming::Link(caption.to_owned())
        );
        assert_eq!(Incoming::classify_message(caption, true, None), Incoming::Ignored);
        assert_eq!(Incoming::classify_message("/start", true, None), Incoming::Ignored);
    }

    #[test]
    fn test_callback_encode_and_parse() {
        let action = CallbackAction {
            kind: MediaKind::Video,
            video_id: "dQw4w9WgXcQ".to_owned(),
            selector: "720".to_owned(),
        };
        let data = action.encode().unwrap();
        assert_eq!(data, "video:dQw4w9WgXcQ:720");
        assert_eq!(CallbackAction::parse(&data), Some(action));
    }

    #[test]
    fn test_callback_audio_format_id() {
        let parsed = CallbackAction::parse("audio:abc:251-drc").unwrap();
        assert_eq!(parsed.kind, MediaKind::Audio);
        assert_eq!(parsed.selector, "251-drc");
    }

    #[test]
    fn test_callback_rejects_malformed() {
        assert_eq!(CallbackAction::parse("video:abc"), None);
        assert_eq!(CallbackAction::parse("video:abc:720:extra"), None);
        assert_eq!(CallbackAction::parse("photo:abc:1"), None);
        assert_eq!(CallbackAction::parse("video:abc:best"), None);
        assert_eq!(CallbackAction::parse("audio::140"), None);
    }

    #[test]
    fn test_callback_encode_respects_limit() {
        let action = CallbackAction {
            kind: MediaKind::Audio,
            video_id: "x".repeat(60),
            selector: "140".to_owned(),
        };
        assert_eq!(action.encode(), None);

        let with_colon = CallbackAction {
            kind: MediaKind::Audio,
            video_id: "a:b".to_owned(),
            selector: "140".to_owned(),
        };
        assert_eq!(with_colon.encode(), None);
    }
}
