//! Telegram channel over the Bot API, using long polling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::config::TelegramConfig;
use crate::error::ChannelError;

const CHANNEL_NAME: &str = "telegram";
const API_BASE: &str = "https://api.telegram.org";
const MAX_MESSAGE_CHARS: usize = 3500;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(2);

pub struct TelegramChannel {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
    owner_id: Option<i64>,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self, ChannelError> {
        Self::with_api_base(config, API_BASE)
    }

    /// Point the channel at a different Bot API host.
    pub fn with_api_base(config: TelegramConfig, api_base: &str) -> Result<Self, ChannelError> {
        let token = config.bot_token.expose_secret();
        if token.trim().is_empty() {
            return Err(ChannelError::StartupFailed {
                name: CHANNEL_NAME.to_string(),
                reason: "bot token cannot be empty".to_string(),
            });
        }

        // The HTTP timeout must outlast the long-poll timeout.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .map_err(|e| ChannelError::StartupFailed {
                name: CHANNEL_NAME.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            poll_timeout_secs: config.poll_timeout_secs,
            owner_id: config.owner_id,
        })
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = mpsc::channel(32);
        let poller = Poller {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            poll_timeout_secs: self.poll_timeout_secs,
            owner_id: self.owner_id,
        };

        tokio::spawn(async move {
            info!("Telegram polling started");
            let mut offset: Option<i64> = None;

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Telegram polling stopped");
                        break;
                    }
                    _ = tx.closed() => break,
                    result = poller.poll_once(offset, &tx) => match result {
                        Ok(next) => offset = Some(next),
                        Err(e) => {
                            warn!("Telegram poll error: {}", e);
                            sleep(POLL_ERROR_BACKOFF).await;
                        }
                    },
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chat_id = msg
            .metadata
            .get("chat_id")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| ChannelError::InvalidMessage("missing chat_id".to_string()))?;

        let text = truncate_for_telegram(&response.content);
        let reply = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&SendMessageRequest {
                chat_id,
                text: &text,
            })
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.without_url().to_string()))?;

        if !reply.status().is_success() {
            let status = reply.status();
            let body = reply
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".to_string());
            return Err(ChannelError::SendFailed {
                name: CHANNEL_NAME.to_string(),
                reason: format!("sendMessage returned {status}: {body}"),
            });
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let reply = self
            .client
            .get(format!("{}/getMe", self.base_url))
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.without_url().to_string()))?;
        if reply.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::Http(format!("getMe returned {}", reply.status())))
        }
    }
}

/// State moved into the polling task.
struct Poller {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
    owner_id: Option<i64>,
}

impl Poller {
    /// Fetch one batch of updates and forward text messages; returns the next
    /// offset to acknowledge.
    async fn poll_once(
        &self,
        current_offset: Option<i64>,
        tx: &mpsc::Sender<IncomingMessage>,
    ) -> Result<i64, ChannelError> {
        let updates = self.get_updates(current_offset).await?;
        let mut next_offset = current_offset.unwrap_or(0);

        for update in updates.result {
            next_offset = next_offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text.filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            let Some(from) = message.from else {
                continue;
            };

            if let Some(owner) = self.owner_id
                && owner != from.id
            {
                debug!(user = from.id, "Ignoring message from non-owner");
                continue;
            }

            let incoming = IncomingMessage::new(CHANNEL_NAME, from.id.to_string(), text)
                .with_metadata(serde_json::json!({
                    "chat_id": message.chat.id,
                    "message_id": message.message_id,
                    "username": from.username,
                }));

            if tx.send(incoming).await.is_err() {
                break;
            }
        }

        Ok(next_offset)
    }

    async fn get_updates(&self, offset: Option<i64>) -> Result<GetUpdatesResponse, ChannelError> {
        let mut request = self
            .client
            .get(format!("{}/getUpdates", self.base_url))
            .query(&[("timeout", self.poll_timeout_secs.to_string())]);

        if let Some(offset) = offset {
            request = request.query(&[("offset", offset.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.without_url().to_string()))?;
        if !response.status().is_success() {
            return Err(ChannelError::Http(format!(
                "getUpdates returned {}",
                response.status()
            )));
        }

        let payload = response
            .json::<GetUpdatesResponse>()
            .await
            .map_err(|e| ChannelError::InvalidMessage(format!("invalid getUpdates payload: {e}")))?;

        if !payload.ok {
            return Err(ChannelError::Http("getUpdates returned ok=false".to_string()));
        }

        Ok(payload)
    }
}

fn truncate_for_telegram(input: &str) -> String {
    if input.chars().count() <= MAX_MESSAGE_CHARS {
        return input.to_string();
    }

    let mut trimmed = input.chars().take(MAX_MESSAGE_CHARS).collect::<String>();
    trimmed.push_str("\n\n[truncated]");
    trimmed
}

#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    ok: bool,
    result: Vec<TelegramUpdate>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
    chat: TelegramChat,
    from: Option<TelegramUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}
