//! Media Download Bot Library
//!
//! A Telegram bot that turns video links into downloadable files.
//!
//! This crate provides the core functionality for:
//! - Loading Telegram credentials and runtime settings
//! - Probing links and downloading media through `yt-dlp`
//! - Building format menus and handling button presses
//! - Connecting to Telegram via `MTProto` and dispatching updates

pub mod commands;
pub mod config;
pub mod downloads;
pub mod media;
pub mod telegram;
