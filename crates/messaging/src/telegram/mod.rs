//! Telegram Bot API client.
//!
//! The bot token travels in the path (`/bot<token>/<method>`) and is
//! redacted from logs. Every response is wrapped in
//! `{"ok": bool, "result": ..., "description": ...}`.

mod models;
mod polling;

pub use models::{Chat, ChatId, Message, ParseMode, SendOptions, Update, User};
pub use polling::{DefaultHandler, UpdateHandler, START_REPLY};

use std::sync::Arc;
use std::time::Duration;

use dipzy_core::http::StatusCode;
use dipzy_core::{
    classify_status, decode_value, ApiError, ApiRequest, ClientConfig, Clock, Credential,
    Credentials, Outcome, RequestExecutor, ResponsePolicy, Result,
};
use log::info;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use models::SendMessage;

pub const API_URL: &str = "https://api.telegram.org";
pub const PROVIDER_ID: &str = "TELEGRAM";

/// Long-poll wait passed to `getUpdates` by the polling loop.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra time on top of the long-poll wait before the HTTP call times out.
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// `"ok": false` in a successful body is a provider error carrying `description`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TelegramPolicy;

impl ResponsePolicy for TelegramPolicy {
    fn provider(&self) -> &'static str {
        PROVIDER_ID
    }

    fn classify_response(&self, status: StatusCode, body: &str) -> Outcome {
        match classify_status(status, body) {
            Outcome::Success(value) if value.get("ok") == Some(&Value::Bool(false)) => {
                Outcome::Provider {
                    message: value
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                }
            }
            other => other,
        }
    }
}

/// Telegram bot.
pub struct TelegramBot {
    token: String,
    executor: RequestExecutor<TelegramPolicy>,
    poll_timeout: Duration,
}

impl TelegramBot {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(token, ClientConfig::default())
    }

    pub fn with_config(token: impl Into<String>, config: ClientConfig) -> Self {
        let token = token.into();
        let executor = RequestExecutor::with_config(
            bot_url(API_URL, &token),
            Credential::Embedded(token.clone()),
            TelegramPolicy,
            config,
        );
        Self {
            token,
            executor,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Create a bot from `TELEGRAM_TOKEN`.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Ok(Self::new(credentials.require_telegram_token()?))
    }

    /// Use another Bot API server (tests, self-hosted servers).
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.executor = self.executor.with_base_url(bot_url(api_url, &self.token));
        self
    }

    /// Replace the clock used for retry backoff and polling pauses.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.executor = self.executor.with_clock(clock);
        self
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        self.executor.clock()
    }

    /// Call a Bot API method and return its `result`.
    pub async fn call<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let mut body = self.executor.execute(request).await?;
        let result = body
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| ApiError::Decode {
                provider: PROVIDER_ID.to_string(),
                message: "response has no 'result'".to_string(),
            })?;
        decode_value(PROVIDER_ID, result)
    }

    /// The bot's own account.
    pub async fn get_me(&self) -> Result<User> {
        self.call(&ApiRequest::get("/getMe")).await
    }

    /// Pending updates starting at `offset`, waiting up to `timeout` for one
    /// to arrive.
    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let mut request = ApiRequest::get("/getUpdates")
            .param("timeout", timeout.as_secs().to_string())
            .timeout(timeout + POLL_TIMEOUT_MARGIN);
        if let Some(offset) = offset {
            request = request.param("offset", offset.to_string());
        }
        self.call(&request).await
    }

    pub async fn send_message(
        &self,
        chat_id: impl Into<ChatId>,
        text: &str,
        options: &SendOptions,
    ) -> Result<Message> {
        let chat_id = chat_id.into();
        let body = serde_json::to_value(SendMessage {
            chat_id: &chat_id,
            text,
            options,
        })
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let message = self
            .call(&ApiRequest::post("/sendMessage").json(body))
            .await?;
        info!("Sent message to {}.", chat_id);
        Ok(message)
    }

    /// Send `text` to several chats in order. Stops at the first failure.
    pub async fn broadcast(&self, chat_ids: &[ChatId], text: &str) -> Result<Vec<Message>> {
        let mut sent = Vec::with_capacity(chat_ids.len());
        for chat_id in chat_ids {
            sent.push(
                self.send_message(chat_id.clone(), text, &SendOptions::default())
                    .await?,
            );
        }
        Ok(sent)
    }

    /// Reply in the chat `message` came from.
    pub async fn reply(&self, message: &Message, text: &str) -> Result<Message> {
        let options = SendOptions {
            reply_to_message_id: Some(message.message_id),
            ..SendOptions::default()
        };
        self.send_message(message.chat.id, text, &options).await
    }

    /// Remove the webhook so `getUpdates` works.
    pub async fn delete_webhook(&self) -> Result<bool> {
        self.call(&ApiRequest::post("/deleteWebhook").json(json!({}))).await
    }
}

fn bot_url(api_url: &str, token: &str) -> String {
    format!("{}/bot{}", api_url.trim_end_matches('/'), token)
}
