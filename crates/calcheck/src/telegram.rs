//! Telegram Bot API `sendMessage` client.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct TelegramBot {
    client: Client,
    api_base: String,
    token: SecretString,
    chat_id: String,
}

impl TelegramBot {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        token: SecretString,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            token,
            chat_id: chat_id.into(),
        }
    }

    /// Send `text` to the configured chat, with HTML formatting enabled.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token.expose_secret()
        );
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("parse_mode", "HTML"),
        ];

        // The token is part of the URL; keep it out of error messages.
        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!(status = status.as_u16(), chars = text.chars().count(), "telegram_message_sent");

        if !status.is_success() {
            return Err(AppError::Telegram {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
