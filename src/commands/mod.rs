//! Command handling module.
//!
//! Turns incoming messages and menu button presses into replies and
//! downloads. Telegram I/O stays in the `telegram` module.

mod handler;
pub mod text;
mod types;

pub use handler::CommandHandler;
pub use types::{
    BotCommand, CallbackAction, DownloadFailure, FormatMenu, Incoming, LinkOutcome,
    MAX_CALLBACK_DATA_LEN, MenuButton,
};
