//! Telegram Bot API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::notify::Messenger;

/// Base URL of the Bot API.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Outer timeout for API calls; must comfortably exceed the long-poll
/// timeout passed to `getUpdates`.
const HTTP_TIMEOUT_SECS: u64 = 90;

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<Option<T>, TelegramError> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(TelegramError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_owned()),
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
}

/// One incoming update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

/// Incoming chat message, reduced to what command handling needs.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Minimal Bot API client: outbound messages and command polling.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Creates a client for the given bot token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        Self::with_base(TELEGRAM_API_BASE, token)
    }

    /// Creates a client against a non-default API base (local test servers).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_base(base: &str, token: &str) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{base}/bot{token}"),
        })
    }

    async fn call<Req, Resp>(&self, method: &str, body: &Req) -> Result<Option<Resp>, TelegramError>
    where
        Req: Serialize + Sync,
        Resp: serde::de::DeserializeOwned + Default,
    {
        let url = format!("{}/{method}", self.base_url);
        let response = self.http.post(url).json(body).send().await?;

        let envelope: ApiResponse<Resp> = response.json().await?;
        envelope.into_result()
    }

    /// Sends rich-text `text` to a chat, with link previews suppressed.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an API-level rejection.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        debug!(chat_id, chars = text.chars().count(), "Sending message");

        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        self.call::<_, serde_json::Value>("sendMessage", &request)
            .await?;
        Ok(())
    }

    /// Long-polls for updates after `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an API-level rejection.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
        };

        let updates = self
            .call::<_, Vec<Update>>("getUpdates", &request)
            .await?
            .unwrap_or_default();
        Ok(updates)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The base URL embeds the bot token, keep it out of logs.
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}
