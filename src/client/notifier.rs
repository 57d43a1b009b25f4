//! Telegram delivery of status change messages

use compact_str::{CompactString, format_compact};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use super::{
    config::ClientConfig,
    error::{ClientError, Result},
};

/// Sends plain-text messages to a single Telegram chat
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    send_url: CompactString,
    chat_id: CompactString,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Bot API reply envelope
#[derive(Debug, Deserialize)]
struct BotApiReply {
    ok: bool,
    description: Option<CompactString>,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: &ClientConfig) -> Self {
        let send_url = format_compact!(
            "{}/bot{}/sendMessage",
            config.telegram_api.trim_end_matches('/'),
            config.credentials.telegram_token
        );

        Self {
            client,
            send_url,
            chat_id: config.credentials.chat_id.clone(),
        }
    }

    /// Deliver `message`, logging instead of propagating any failure
    ///
    /// Returns whether the message was delivered.
    pub async fn notify(&self, message: &str) -> bool {
        match self.send_message(message).await {
            Ok(()) => {
                info!(chat_id = %self.chat_id, "Message sent");
                true
            },
            Err(e) => {
                error!(chat_id = %self.chat_id, error = %e, "Failed to send message");
                false
            },
        }
    }

    /// Single delivery attempt through the Bot API `sendMessage` method
    #[instrument(skip(self, message), fields(chat_id = %self.chat_id, len = message.len()))]
    pub async fn send_message(&self, message: &str) -> Result<()> {
        if self.chat_id.is_empty() {
            return Err(ClientError::notify_failed("chat id is not configured"));
        }

        let response = self
            .client
            .post(self.send_url.as_str())
            .json(&SendMessage { chat_id: &self.chat_id, text: message })
            .send()
            .await
            .map_err(|e| ClientError::notify_failed(e.without_url()))?;

        let status = response.status();
        let reply = response.json::<BotApiReply>().await;

        match reply {
            Ok(BotApiReply { ok: true, .. }) if status.is_success() => Ok(()),
            Ok(BotApiReply { description, .. }) => Err(ClientError::notify_failed(format_args!(
                "HTTP {}: {}",
                status.as_u16(),
                description.as_deref().unwrap_or("no description")
            ))),
            Err(_) => Err(ClientError::notify_failed(format_args!(
                "HTTP {}: unreadable reply",
                status.as_u16()
            ))),
        }
    }
}

// The send URL embeds the bot token
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}
