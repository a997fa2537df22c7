//! Command handler implementation.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::text;
use super::types::{
    BotCommand, CallbackAction, DownloadFailure, FormatMenu, LinkOutcome, MenuButton,
};
use crate::downloads::{DownloadRunner, MediaFile, RememberedVideo, VideoMemory};
use crate::media::{
    DownloadRequest, MediaError, MediaKind, VideoInfo, download_options, video_format_selector,
};

/// Title used when the video was not presented in this session.
const FALLBACK_TITLE: &str = "video";

/// Handles commands, links and menu button presses.
pub struct CommandHandler {
    /// Download runner (also gives access to the media backend).
    runner: Arc<DownloadRunner>,

    /// Videos recently presented to users.
    memory: RwLock<VideoMemory>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(runner: Arc<DownloadRunner>, remembered_videos: usize) -> Self {
        Self {
            runner,
            memory: RwLock::new(VideoMemory::new(remembered_videos)),
        }
    }

    /// Builds the HTML reply to a command.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn handle_command(&self, command: BotCommand, user_id: i64, user_name: &str) -> String {
        debug!("Handling command: {}", command);
        match command {
            BotCommand::Start => text::greeting(user_id, user_name),
            BotCommand::Help => text::help_text(),
        }
    }

    /// Resolves a link and builds the format menu for it.
    pub async fn handle_link(&self, user_id: i64, url: &str) -> LinkOutcome {
        match self.runner.backend().fetch_info(url).await {
            Ok(info) => self.build_menu(user_id, info).await,
            Err(e) if e.is_extractor_failure() => {
                error!("Extractor error while resolving link: {}", e);
                LinkOutcome::Failed(match e {
                    MediaError::Unavailable(_) => text::UNAVAILABLE,
                    MediaError::InvalidUrl(_) => text::INVALID_LINK,
                    _ => text::UNSUPPORTED,
                })
            }
            Err(e) => {
                error!("Generic error while resolving link: {}", e);
                LinkOutcome::Failed(text::UNEXPECTED)
            }
        }
    }

    async fn build_menu(&self, user_id: i64, info: VideoInfo) -> LinkOutcome {
        let buttons: Vec<MenuButton> = download_options(&info)
            .iter()
            .filter_map(|option| {
                let data = CallbackAction::for_option(&info.id, option).encode();
                if data.is_none() {
                    warn!("Skipping option {:?}: callback data too long", option);
                }
                data.map(|data| MenuButton {
                    label: text::option_label(option),
                    data,
                })
            })
            .collect();

        if buttons.is_empty() {
            info!("No suitable formats for [{}]", info.id);
            return LinkOutcome::Failed(text::NO_FORMATS);
        }

        self.memory.write().await.remember(
            user_id,
            &info.id,
            RememberedVideo {
                title: info.title.clone(),
                webpage_url: info.webpage_url.clone(),
            },
        );

        info!(
            "Offering {} formats for [{}] \"{}\"",
            buttons.len(),
            info.id,
            truncate(&info.title, 40)
        );

        LinkOutcome::Menu(FormatMenu {
            caption_html: text::menu_caption(&info.title),
            thumbnail: info.thumbnail,
            buttons,
        })
    }

    /// Downloads the format selected by a menu button.
    ///
    /// The returned file is deleted once dropped.
    pub async fn handle_download(
        &self,
        user_id: i64,
        callback_data: &str,
    ) -> Result<MediaFile, DownloadFailure> {
        let Some(action) = CallbackAction::parse(callback_data) else {
            warn!("Ignoring malformed callback data: {:?}", callback_data);
            return Err(DownloadFailure::Expired);
        };

        let remembered = self
            .memory
            .read()
            .await
            .recall(user_id, &action.video_id)
            .cloned();

        let (title, url) = match remembered {
            Some(video) => {
                let url = video
                    .webpage_url
                    .unwrap_or_else(|| youtube_url(&action.video_id));
                (video.title, url)
            }
            None => (FALLBACK_TITLE.to_owned(), youtube_url(&action.video_id)),
        };

        let format = match action.kind {
            MediaKind::Video => video_format_selector(&action.selector),
            MediaKind::Audio => action.selector.clone(),
        };
        let request = DownloadRequest {
            url,
            format,
            kind: action.kind,
        };

        self.runner
            .run(user_id, &action.video_id, &request, title)
            .await
            .map_err(|e| {
                if e.is_extractor_failure() {
                    error!("Error during download (extractor): {}", e);
                    DownloadFailure::Download
                } else {
                    error!("Generic error during download: {}", e);
                    DownloadFailure::Unexpected
                }
            })
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

/// Watch page URL for a YouTube video id.
fn youtube_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Truncates a string for logging.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
