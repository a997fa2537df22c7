//! Update loop.
//!
//! Every update is handled on its own task:
//! - text messages: commands get a direct reply, anything else is treated
//!   as a link and answered with a format menu (or a failure notice)
//! - button presses: the selected format is downloaded, uploaded to the
//!   chat, and the menu message is removed
//!
//! Ctrl+C stops the loop; in-flight tasks get a grace period to finish.

use std::sync::Arc;
use std::time::Duration;

use grammers_client::types::Message;
use grammers_client::update::{CallbackQuery, Update};
use grammers_client::{Client, SenderPool, UpdatesConfiguration};
use grammers_session::storages::SqliteSession;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::client::message_sender;
use super::{TelegramBot, TelegramError};
use crate::commands::{CommandHandler, DownloadFailure, Incoming, LinkOutcome, text};
use crate::config::TelegramConfig;

/// How long in-flight updates may keep running after shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Connects to Telegram and dispatches updates to the command handler.
pub struct Dispatcher {
    config: TelegramConfig,
    handler: Arc<CommandHandler>,
    min_chat_interval: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(config: TelegramConfig, handler: Arc<CommandHandler>, min_chat_interval: Duration) -> Self {
        Self {
            config,
            handler,
            min_chat_interval,
        }
    }

    /// Connects, signs in and processes updates until Ctrl+C.
    pub async fn run(self) -> Result<(), TelegramError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&self.config.session_path)
                .await
                .map_err(|e| TelegramError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), self.config.api_id);

        let client = Client::new(handle.clone());
        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        let bot = Arc::new(TelegramBot::new(
            client,
            handle.thin,
            pool_task,
            self.min_chat_interval,
        ));

        bot.sign_in_bot(&self.config.bot_token, &self.config.api_hash)
            .await?;

        if let Err(e) = bot.register_commands().await {
            warn!("Failed to register bot commands: {}", e);
        }

        let mut stream = bot
            .inner()
            .stream_updates(
                updates,
                UpdatesConfiguration {
                    catch_up: false,
                    ..Default::default()
                },
            )
            .await;

        info!("Bot is up and running. Use Ctrl+C to stop.");

        let mut tasks = JoinSet::new();
        let result = loop {
            let update = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                    break Ok(());
                }
                update = stream.next() => update,
            };

            // Reap finished tasks so the set does not grow unbounded.
            while tasks.try_join_next().is_some() {}

            match update {
                Ok(update) => {
                    let bot = Arc::clone(&bot);
                    let handler = Arc::clone(&self.handler);
                    tasks.spawn(async move {
                        if let Err(e) = handle_update(&bot, &handler, update).await {
                            error!("Failed to handle update: {}", e);
                        }
                    });
                }
                Err(e) => break Err(TelegramError::from(e)),
            }
        };

        info!("Waiting for {} in-flight updates...", tasks.len());
        if tokio::time::timeout(SHUTDOWN_GRACE, async {
            while tasks.join_next().await.is_some() {}
        })
        .await
        .is_err()
        {
            warn!("Grace period elapsed, aborting remaining tasks");
            tasks.shutdown().await;
        }

        stream.sync_update_state().await;
        bot.disconnect();
        result
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("min_chat_interval", &self.min_chat_interval)
            .finish_non_exhaustive()
    }
}

async fn handle_update(
    bot: &TelegramBot,
    handler: &CommandHandler,
    update: Update,
) -> Result<(), TelegramError> {
    match update {
        Update::NewMessage(message) if !message.outgoing() => {
            handle_message(bot, handler, &message).await
        }
        Update::CallbackQuery(query) => handle_callback(bot, handler, &query).await,
        _ => Ok(()),
    }
}

async fn handle_message(
    bot: &TelegramBot,
    handler: &CommandHandler,
    message: &Message,
) -> Result<(), TelegramError> {
    let incoming =
        Incoming::classify_message(message.text(), message.media().is_some(), bot.username());
    if incoming == Incoming::Ignored {
        return Ok(());
    }

    let Some(sender) = message_sender(message) else {
        debug!("Ignoring message without a user sender");
        return Ok(());
    };

    match incoming {
        Incoming::Ignored => Ok(()),
        Incoming::Command(command) => {
            let reply = handler.handle_command(command, sender.id, &sender.name);
            bot.reply_html(message, &reply).await.map(drop)
        }
        Incoming::Link(url) => {
            let status = bot.reply_html(message, text::PROCESSING).await?;

            match handler.handle_link(sender.id, &url).await {
                LinkOutcome::Menu(menu) => {
                    bot.delete(&status).await?;
                    bot.reply_menu(message, &menu).await.map(drop)
                }
                LinkOutcome::Failed(reason) => bot.edit_html(&status, reason).await,
            }
        }
    }
}

async fn handle_callback(
    bot: &TelegramBot,
    handler: &CommandHandler,
    query: &CallbackQuery,
) -> Result<(), TelegramError> {
    let user_id = query.sender().id().bare_id();
    let data = String::from_utf8_lossy(query.data()).into_owned();
    debug!("Button pressed by {}: {}", user_id, data);

    bot.answer(query).await?;
    let menu = query.load_message().await?;

    if let Err(e) = bot.edit_html(&menu, text::PREPARING_DOWNLOAD).await {
        debug!("Could not show download status: {}", e);
    }

    match handler.handle_download(user_id, &data).await {
        Ok(file) => {
            let delivered = async {
                bot.edit_html(&menu, text::UPLOADING).await?;
                bot.send_media(&menu, &file).await?;
                bot.delete(&menu).await
            }
            .await;

            if let Err(e) = delivered {
                error!("Generic error during upload: {}", e);
                bot.edit_html(&menu, DownloadFailure::Unexpected.message_html())
                    .await?;
            }
            Ok(())
        }
        Err(failure) => bot.edit_html(&menu, failure.message_html()).await,
    }
}
