//! Telegram client wrapper for the download bot.

use std::sync::OnceLock;
use std::time::Duration;

use grammers_client::types::{Attribute, Message, Peer};
use grammers_client::update::CallbackQuery;
use grammers_client::{Client, InputMessage, InvocationError, button, reply_markup, sender};
use grammers_tl_types as tl;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::RateLimiter;
use crate::commands::{BotCommand, FormatMenu};
use crate::downloads::MediaFile;
use crate::media::MediaKind;

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        if let InvocationError::Rpc(rpc) = &err
            && rpc.name.starts_with("FLOOD_WAIT")
        {
            return Self::FloodWait(rpc.value.unwrap_or(1));
        }

        let err_str = err.to_string();
        if (err_str.contains("FLOOD_WAIT") || err_str.contains("flood"))
            && let Some(seconds) = extract_flood_wait_seconds(&err_str)
        {
            return Self::FloodWait(seconds);
        }

        Self::Invocation(err_str)
    }
}

/// Extracts flood wait seconds from an error message.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let patterns = ["FLOOD_WAIT_", "flood wait "];
    let lowered = err_msg.to_lowercase();

    for pattern in patterns {
        if let Some(idx) = lowered.find(&pattern.to_lowercase()) {
            let start = idx + pattern.len();
            let num_str: String = lowered[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(seconds) = num_str.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

/// Identity of the user who sent a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub name: String,
}

/// Returns the sending user of a message, if it was sent by a user.
#[must_use]
pub fn message_sender(message: &Message) -> Option<Sender> {
    match message.sender()? {
        Peer::User(user) => Some(Sender {
            id: user.id().bare_id(),
            name: user.full_name(),
        }),
        _ => None,
    }
}

/// Pacing key of the chat a message lives in.
///
/// Uses the Bot API dialog id so users, groups and channels never collide.
#[must_use]
pub fn chat_key(message: &Message) -> i64 {
    message.chat().id().bot_api_dialog_id()
}

/// High-level Telegram client wrapper.
pub struct TelegramBot {
    /// The underlying grammers client.
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// Pacing for outgoing messages, keyed by chat.
    rate_limiter: RateLimiter,

    /// Username reported at sign-in.
    username: OnceLock<String>,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl TelegramBot {
    /// Wraps a connected client.
    #[must_use]
    pub fn new(
        client: Client,
        handle: sender::SenderPoolHandle,
        pool_task: JoinHandle<()>,
        min_chat_interval: Duration,
    ) -> Self {
        Self {
            client,
            handle,
            rate_limiter: RateLimiter::new(min_chat_interval),
            username: OnceLock::new(),
            _pool_task: pool_task,
        }
    }

    /// Checks if the client is authorized.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Signs in with a bot token unless the session is already authorized.
    ///
    /// Remembers the bot's username so commands addressed to other bots
    /// can be told apart in groups.
    pub async fn sign_in_bot(&self, token: &str, api_hash: &str) -> Result<(), TelegramError> {
        let user = if self.is_authorized().await? {
            debug!("Session already authorized");
            self.client.get_me().await?
        } else {
            info!("Signing in as bot...");
            self.client
                .bot_sign_in(token, api_hash)
                .await
                .map_err(|e| TelegramError::SignInFailed(e.to_string()))?
        };

        let username = user.username().unwrap_or("unknown");
        info!("Signed in as @{}", username);
        if let Some(name) = user.username() {
            let _ = self.username.set(name.to_owned());
        }
        Ok(())
    }

    /// The bot's own username, known after sign-in.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    /// Publishes the command list shown in the bot menu.
    pub async fn register_commands(&self) -> Result<(), TelegramError> {
        let request = tl::functions::bots::SetBotCommands {
            scope: tl::enums::BotCommandScope::Default,
            lang_code: String::new(),
            commands: BotCommand::all()
                .iter()
                .map(|cmd| {
                    tl::types::BotCommand {
                        command: cmd.name().to_owned(),
                        description: cmd.description().to_owned(),
                    }
                    .into()
                })
                .collect(),
        };

        self.client.invoke(&request).await?;
        info!("Registered {} bot commands", BotCommand::all().len());
        Ok(())
    }

    /// Runs an API call after waiting for the chat's slot, pausing on flood waits.
    async fn paced<T>(
        &self,
        chat: i64,
        call: impl Future<Output = Result<T, InvocationError>>,
    ) -> Result<T, TelegramError> {
        self.rate_limiter.wait_and_acquire(chat).await;

        match call.await {
            Ok(value) => Ok(value),
            Err(e) => {
                let err: TelegramError = e.into();
                if let TelegramError::FloodWait(seconds) = &err {
                    warn!("Flood wait triggered: {} seconds", seconds);
                    self.rate_limiter.handle_flood_wait(*seconds).await;
                }
                Err(err)
            }
        }
    }

    /// Replies to a message with HTML text.
    pub async fn reply_html(
        &self,
        to: &Message,
        html: &str,
    ) -> Result<Message, TelegramError> {
        self.paced(chat_key(to), to.reply(InputMessage::html(html))).await
    }

    /// Replies with the format menu: a photo with caption when a thumbnail
    /// is available, plain text otherwise.
    pub async fn reply_menu(
        &self,
        to: &Message,
        menu: &FormatMenu,
    ) -> Result<Message, TelegramError> {
        let markup = reply_markup::inline(
            menu.buttons
                .iter()
                .map(|b| vec![button::inline(b.label.clone(), b.data.clone().into_bytes())])
                .collect::<Vec<_>>(),
        );

        if let Some(thumbnail) = &menu.thumbnail {
            let message = InputMessage::html(&menu.caption_html)
                .photo_url(thumbnail)
                .reply_markup(&markup);
            match self.paced(chat_key(to), to.reply(message)).await {
                Ok(sent) => return Ok(sent),
                Err(TelegramError::FloodWait(seconds)) => return Err(TelegramError::FloodWait(seconds)),
                Err(e) => warn!("Failed to send thumbnail, falling back to text: {}", e),
            }
        }

        let message = InputMessage::html(&menu.caption_html).reply_markup(&markup);
        self.paced(chat_key(to), to.reply(message)).await
    }

    /// Replaces the text (or caption) of a message, dropping its buttons.
    pub async fn edit_html(
        &self,
        message: &Message,
        html: &str,
    ) -> Result<(), TelegramError> {
        self.paced(chat_key(message), message.edit(InputMessage::html(html))).await
    }

    /// Deletes a message.
    pub async fn delete(&self, message: &Message) -> Result<(), TelegramError> {
        message.delete().await.map_err(Into::into)
    }

    /// Answers a callback query so the client stops its spinner.
    pub async fn answer(&self, query: &CallbackQuery) -> Result<(), TelegramError> {
        query.answer().send().await.map_err(Into::into)
    }

    /// Uploads a downloaded file into the chat of `menu`.
    ///
    /// Audio goes out with a title attribute; video as a streamable mp4
    /// with the title as caption.
    pub async fn send_media(
        &self,
        menu: &Message,
        file: &MediaFile,
    ) -> Result<Message, TelegramError> {
        info!("Uploading {}", file.path().display());
        let uploaded = self
            .client
            .upload_file(file.path())
            .await
            .map_err(|e| TelegramError::Upload(e.to_string()))?;

        let message = match file.kind() {
            MediaKind::Audio => InputMessage::text("")
                .document(uploaded)
                .mime_type("audio/mp4")
                .attribute(Attribute::Audio {
                    duration: Duration::ZERO,
                    title: Some(file.title().to_owned()),
                    performer: None,
                }),
            MediaKind::Video => InputMessage::text(file.title())
                .document(uploaded)
                .mime_type("video/mp4")
                .attribute(Attribute::Video {
                    round_message: false,
                    supports_streaming: true,
                    duration: Duration::ZERO,
                    w: 0,
                    h: 0,
                }),
        };

        self.paced(chat_key(menu), menu.respond(message)).await
    }

    /// Returns a reference to the underlying client for advanced operations.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Disconnects from Telegram.
    pub fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_flood_wait() {
        assert_eq!(extract_flood_wait_seconds("FLOOD_WAIT_120"), Some(120));
        assert_eq!(extract_flood_wait_seconds("flood wait 60 seconds"), Some(60));
        assert_eq!(extract_flood_wait_seconds("some other error"), None);
    }

    #[test]
    fn test_extract_flood_wait_is_case_insensitive() {
        assert_eq!(extract_flood_wait_seconds("Flood Wait 7s"), Some(7));
    }
}
