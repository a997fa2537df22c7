//! Application settings and Telegram configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::BOT_TOKEN_VAR;

/// Telegram API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Bot token issued by `@BotFather`.
    pub bot_token: String,

    /// Path to the session file.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("bot.session")
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub fn new(api_id: i32, api_hash: String, bot_token: String) -> Self {
        Self {
            api_id,
            api_hash,
            bot_token,
            session_path: default_session_path(),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TG_API_ID`, `TG_API_HASH` and `TELEGRAM_BOT_TOKEN` to be set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_id: i32 = lookup("TG_API_ID")
            .ok_or(ConfigError::MissingEnvVar("TG_API_ID"))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidApiId)?;

        let api_hash = lookup("TG_API_HASH").ok_or(ConfigError::MissingEnvVar("TG_API_HASH"))?;

        let bot_token = lookup(BOT_TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar(BOT_TOKEN_VAR))?;

        let session_path = lookup("TG_SESSION_PATH").map_or_else(default_session_path, PathBuf::from);

        Ok(Self {
            api_id,
            api_hash,
            bot_token,
            session_path,
        })
    }
}

// The token grants full control of the bot, keep it out of logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_id", &self.api_id)
            .field("session_path", &self.session_path)
            .finish_non_exhaustive()
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Directory where downloads are staged before upload.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Path or name of the `yt-dlp` executable.
    #[serde(default = "default_extractor_path")]
    pub extractor_path: PathBuf,

    /// Upper bound for a single extractor run in seconds.
    #[serde(default = "default_extractor_timeout")]
    pub extractor_timeout_secs: u64,

    /// How many downloads may run at the same time.
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,

    /// How many presented videos are remembered for button presses.
    #[serde(default = "default_remembered_videos")]
    pub remembered_videos: usize,

    /// Minimum interval between outgoing messages to the same chat in milliseconds.
    #[serde(default = "default_min_chat_interval")]
    pub min_chat_interval_ms: u64,
}

fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("media-bot")
}

fn default_extractor_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_extractor_timeout() -> u64 {
    900 // 15 minutes covers long videos on slow links
}

fn default_max_concurrent_downloads() -> usize {
    4
}

fn default_remembered_videos() -> usize {
    1024
}

fn default_min_chat_interval() -> u64 {
    1000
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            extractor_path: default_extractor_path(),
            extractor_timeout_secs: default_extractor_timeout(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
            remembered_videos: default_remembered_videos(),
            min_chat_interval_ms: default_min_chat_interval(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            download_dir: lookup("DOWNLOAD_DIR").map_or_else(default_download_dir, PathBuf::from),
            extractor_path: lookup("YT_DLP_PATH").map_or_else(default_extractor_path, PathBuf::from),
            extractor_timeout_secs: parse_var(&lookup, "EXTRACTOR_TIMEOUT_SECS")
                .filter(|&n: &u64| n > 0)
                .unwrap_or_else(default_extractor_timeout),
            max_concurrent_downloads: parse_var(&lookup, "MAX_CONCURRENT_DOWNLOADS")
                .filter(|&n: &usize| n > 0)
                .unwrap_or_else(default_max_concurrent_downloads),
            remembered_videos: parse_var(&lookup, "REMEMBERED_VIDEOS")
                .filter(|&n: &usize| n > 0)
                .unwrap_or_else(default_remembered_videos),
            min_chat_interval_ms: parse_var(&lookup, "MIN_CHAT_INTERVAL_MS")
                .unwrap_or_else(default_min_chat_interval),
        }
    }

    /// Timeout applied to every extractor run.
    #[must_use]
    pub const fn extractor_timeout(&self) -> Duration {
        Duration::from_secs(self.extractor_timeout_secs)
    }

    /// Minimum spacing between messages sent to one chat.
    #[must_use]
    pub const fn min_chat_interval(&self) -> Duration {
        Duration::from_millis(self.min_chat_interval_ms)
    }
}

/// Reads and parses a variable, treating unparseable values as unset.
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid API ID format (must be a positive integer)")]
    InvalidApiId,
}
