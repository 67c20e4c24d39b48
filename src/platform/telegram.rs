use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::platform::RawUpdate;

/// Slack added on top of the long-poll wait before the HTTP client gives up
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered, but not with `ok: true` and a usable result.
    #[error("bad response from Telegram {method}: {reason}")]
    BadResponse { method: &'static str, reason: String },
    #[error("request to Telegram {method} failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// The subset of the Bot API the bot talks to
#[async_trait]
pub trait BotApi: Send + Sync {
    /// One long-polling round. `offset = None` lets the server pick.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<RawUpdate>, ApiError>;

    async fn send_message(&self, chat_id: &str, text: &str, markdown: bool)
        -> Result<(), ApiError>;

    async fn send_sticker(&self, chat_id: &str, file_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

/// Bot API client over plain HTTPS
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs) + REQUEST_TIMEOUT_SLACK)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), token),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport { method, source };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        // Telegram reports most failures as `ok: false` with a 4xx status,
        // so the body is decoded regardless of the status code.
        let parsed: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::BadResponse {
                method,
                reason: format!("invalid JSON (HTTP {}): {}", status.as_u16(), e),
            })?;

        if !parsed.ok {
            return Err(ApiError::BadResponse {
                method,
                reason: parsed
                    .description
                    .unwrap_or_else(|| format!("ok=false (HTTP {})", status.as_u16())),
            });
        }

        parsed.result.ok_or_else(|| ApiError::BadResponse {
            method,
            reason: "missing result".to_string(),
        })
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<RawUpdate>, ApiError> {
        let mut query = vec![("timeout", timeout_secs.to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        debug!("getUpdates offset={:?} timeout={}", offset, timeout_secs);
        let request = self.client.get(self.url("getUpdates")).query(&query);
        self.call("getUpdates", request).await
    }

    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        markdown: bool,
    ) -> Result<(), ApiError> {
        let mut params = vec![("chat_id", chat_id), ("text", text)];
        if markdown {
            params.push(("parse_mode", "Markdown"));
        }

        let request = self.client.post(self.url("sendMessage")).form(&params);
        self.call::<serde_json::Value>("sendMessage", request)
            .await
            .map(|_| ())
    }

    async fn send_sticker(&self, chat_id: &str, file_id: &str) -> Result<(), ApiError> {
        let params = [("chat_id", chat_id), ("sticker", file_id)];
        let request = self.client.post(self.url("sendSticker")).form(&params);
        self.call::<serde_json::Value>("sendSticker", request)
            .await
            .map(|_| ())
    }
}
