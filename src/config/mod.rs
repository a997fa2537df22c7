//! Configuration module for the download bot.
//!
//! Handles loading Telegram credentials and runtime settings
//! from the environment.

mod settings;

pub use settings::{BotSettings, ConfigError, TelegramConfig};

/// Environment variable holding the bot token issued by `@BotFather`.
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
