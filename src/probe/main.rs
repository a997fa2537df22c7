//! Standalone link probe.
//!
//! Resolves a link with the extractor and prints the menu the bot would
//! offer for it, without connecting to Telegram.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use media_download_bot::commands::text::{format_size, option_label};
use media_download_bot::commands::CallbackAction;
use media_download_bot::media::{MediaBackend, YtDlp, download_options};

/// Link probe for the download bot.
#[derive(Parser, Debug)]
#[command(name = "probe_link")]
#[command(about = "Shows which download options the bot would offer for a link")]
#[command(version)]
struct Args {
    /// Link to resolve.
    url: String,

    /// Path or name of the yt-dlp executable.
    #[arg(long, default_value = "yt-dlp")]
    extractor: PathBuf,

    /// Timeout for the extractor in seconds.
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Also list every format the extractor reported.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let backend = YtDlp::new(args.extractor, Duration::from_secs(args.timeout));

    let info = match backend.fetch_info(&args.url).await {
        Ok(info) => info,
        Err(e) => {
            eprintln!("✗ Failed to resolve link: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Title: {}", info.title);
    println!("ID:    {}", info.id);
    if let Some(thumbnail) = &info.thumbnail {
        println!("Thumb: {thumbnail}");
    }

    if args.verbose {
        println!("\nFormats ({}):", info.formats.len());
        for format in &info.formats {
            println!(
                "  {:>10}  {:<5} {:>5}  v={:<12} a={:<12} {}",
                format.format_id,
                format.ext,
                format.height.map_or_else(|| "-".to_owned(), |h| format!("{h}p")),
                format.vcodec.as_deref().unwrap_or("?"),
                format.acodec.as_deref().unwrap_or("?"),
                format_size(format.size()),
            );
        }
    }

    let options = download_options(&info);
    if options.is_empty() {
        println!("\n✗ No suitable download formats found.");
        return ExitCode::FAILURE;
    }

    println!("\nMenu:");
    for option in &options {
        let data = CallbackAction::for_option(&info.id, option)
            .encode()
            .unwrap_or_else(|| "<too long>".to_owned());
        println!("  {:<24} [{data}]", option_label(option));
    }

    println!("\n✓ {} options available", options.len());
    ExitCode::SUCCESS
}
