//! Long-polling loop and command dispatch.

use std::time::Duration;

use async_trait::async_trait;
use dipzy_core::{ApiError, CancelToken, Result};
use log::{debug, info, warn};

use super::{Message, TelegramBot, Update};

/// Reply to `/start` from [`DefaultHandler`].
pub const START_REPLY: &str = "Notifications on!";

/// Pause before polling again after `getUpdates` failed.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Callbacks for incoming messages.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    /// `/start` command. Replies [`START_REPLY`] by default.
    async fn on_start(&self, bot: &TelegramBot, message: &Message) -> Result<()> {
        bot.reply(message, START_REPLY).await.map(|_| ())
    }

    /// Any other message.
    async fn on_message(&self, _bot: &TelegramBot, _message: &Message) -> Result<()> {
        Ok(())
    }
}

/// Handler that only answers `/start`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHandler;

impl UpdateHandler for DefaultHandler {}

impl TelegramBot {
    /// Poll for updates and dispatch them to `handler` until `cancel` fires.
    ///
    /// Handler errors are logged and do not stop the loop. A failed
    /// `getUpdates` call is logged and retried after a pause.
    pub async fn run_polling<H: UpdateHandler>(&self, handler: &H, cancel: &CancelToken) -> Result<()> {
        info!("Telegram bot started polling...");
        let mut offset: Option<i64> = None;

        while !cancel.is_cancelled() {
            let updates = tokio::select! {
                _ = cancel.cancelled() => break,
                updates = self.get_updates(offset, self.poll_timeout()) => updates,
            };

            match updates {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        if let Err(e) = self.dispatch(handler, &update).await {
                            warn!("Update \"{}\" caused error \"{}\"", update.update_id, e);
                        }
                    }
                }
                Err(ApiError::Cancelled) => break,
                Err(e) => {
                    warn!("Polling for updates failed: {}", e);
                    let clock = self.clock();
                    let paused = tokio::select! {
                        _ = cancel.cancelled() => Err(ApiError::Cancelled),
                        paused = clock.sleep(POLL_ERROR_PAUSE) => paused,
                    };
                    if paused.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Telegram bot stopped polling.");
        Ok(())
    }

    async fn dispatch<H: UpdateHandler>(&self, handler: &H, update: &Update) -> Result<()> {
        let Some(message) = &update.message else {
            debug!("Skipping update {} without message", update.update_id);
            return Ok(());
        };

        match message.command() {
            Some("start") => handler.on_start(self, message).await,
            _ => handler.on_message(self, message).await,
        }
    }
}
