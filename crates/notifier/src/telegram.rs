//! Telegram Bot API delivery via `sendMessage`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use homework_common::config::AppConfig;
use homework_common::error::AppError;

use crate::Messenger;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages to a single fixed chat.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build Telegram client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.telegram_api_url.clone(),
            config.telegram_token.clone(),
            config.telegram_chat_id.clone(),
            config.http_timeout(),
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }
}

impl Messenger for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<(), AppError> {
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        // The URL embeds the bot token, so reqwest errors are stripped of it
        // before they reach the log.
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Send(e.without_url().to_string()))?;

        let status = response.status();
        let envelope: Option<BotApiResponse> = response.json().await.ok();

        match envelope {
            Some(BotApiResponse { ok: true, .. }) if status.is_success() => {
                tracing::info!(chat_id = %self.chat_id, "Message sent");
                Ok(())
            }
            Some(BotApiResponse { description, .. }) => Err(AppError::Send(format!(
                "Telegram responded with {}: {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(AppError::Send(format!(
                "Telegram responded with {} and an unreadable body",
                status.as_u16()
            ))),
        }
    }
}
