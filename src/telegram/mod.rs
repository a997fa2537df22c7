//! Telegram client wrapper module.
//!
//! Provides the connection, sign-in, message pacing and the update loop
//! that feeds the command handler.

mod client;
mod dispatcher;
mod rate_limiter;

pub use client::{Sender, TelegramBot, TelegramError, message_sender};
pub use dispatcher::Dispatcher;
pub use rate_limiter::RateLimiter;
