use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use super::types::{ApiResponse, File};
use crate::config::DEFAULT_TELEGRAM_API_BASE;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Telegram {method} failed with status {status}")]
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },

    #[error("Telegram {method} returned ok=false: {description}")]
    Api {
        method: &'static str,
        description: String,
    },

    #[error("Telegram did not return a file_path")]
    MissingFilePath,
}

/// The Bot API calls the webhook handler depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    /// Resolve a file id to a URL the file can be downloaded from.
    async fn get_file_url(&self, file_id: &str) -> Result<String, TelegramError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    api_base: String,
}

impl TelegramClient {
    pub fn new(bot_token: String) -> Self {
        Self::with_api_base(bot_token, DEFAULT_TELEGRAM_API_BASE.to_string())
    }

    pub fn with_api_base(bot_token: String, api_base: String) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.bot_token, file_path)
    }

    /// Point the bot's webhook at `url`.
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        let body = json!({
            "url": url,
            "allowed_updates": ["message", "edited_message"],
        });

        let resp = self
            .client
            .post(self.method_url("setWebhook"))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Telegram setWebhook error: {}", body);
            return Err(TelegramError::Status {
                method: "setWebhook",
                status: status.as_u16(),
                body,
            });
        }

        let data: ApiResponse<bool> = resp.json().await?;
        if !data.ok {
            return Err(TelegramError::Api {
                method: "setWebhook",
                description: data.description.unwrap_or_default(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl TelegramApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Failed to send Telegram message: {}", body);
            return Err(TelegramError::Status {
                method: "sendMessage",
                status: status.as_u16(),
                body,
            });
        }

        debug!("Sent Telegram message to chat {}", chat_id);
        Ok(())
    }

    async fn get_file_url(&self, file_id: &str) -> Result<String, TelegramError> {
        let resp = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Failed to fetch Telegram file metadata: {}", body);
            return Err(TelegramError::Status {
                method: "getFile",
                status: status.as_u16(),
                body,
            });
        }

        let data: ApiResponse<File> = resp.json().await?;
        if !data.ok {
            error!("Invalid Telegram getFile response: {:?}", data);
            return Err(TelegramError::Api {
                method: "getFile",
                description: data.description.unwrap_or_default(),
            });
        }

        match data
            .result
            .and_then(|file| file.file_path)
            .filter(|path| !path.is_empty())
        {
            Some(path) => Ok(self.file_url(&path)),
            None => {
                error!("Telegram getFile response for {} has no file_path", file_id);
                Err(TelegramError::MissingFilePath)
            }
        }
    }
}
