//! Media Download Bot - Main Entry Point
//!
//! A Telegram bot that offers the available qualities of a video link
//! and sends the chosen video or audio track back to the chat.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use media_download_bot::commands::CommandHandler;
use media_download_bot::config::{BotSettings, TelegramConfig};
use media_download_bot::downloads::DownloadRunner;
use media_download_bot::media::YtDlp;
use media_download_bot::telegram::Dispatcher;

/// Telegram bot that downloads videos and audio from links.
#[derive(Parser, Debug)]
#[command(name = "media_download_bot")]
#[command(about = "Download videos and audio tracks from links straight into Telegram")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Directory for staging downloads (overrides `DOWNLOAD_DIR`).
    #[arg(short, long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let mut settings = BotSettings::from_env_with_defaults();
    if let Some(dir) = args.download_dir {
        settings.download_dir = dir;
    }

    info!(
        "Downloads staged in {} (max {} concurrent, extractor: {})",
        settings.download_dir.display(),
        settings.max_concurrent_downloads,
        settings.extractor_path.display()
    );

    let backend = Arc::new(YtDlp::new(
        settings.extractor_path.clone(),
        settings.extractor_timeout(),
    ));
    let runner = Arc::new(DownloadRunner::new(
        backend,
        settings.download_dir.clone(),
        settings.max_concurrent_downloads,
    ));
    let handler = Arc::new(CommandHandler::new(runner, settings.remembered_videos));

    Dispatcher::new(tg_config, handler, settings.min_chat_interval())
        .run()
        .await
        .context("Bot stopped with an error")?;

    info!("Shut down cleanly");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
