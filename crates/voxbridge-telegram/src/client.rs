use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{Result, TelegramError},
    types::{ApiResponse, BotCommand, File, Message, Update},
};

/// Extra time on top of the long-poll timeout before the HTTP request is abandoned
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Minimal Telegram Bot API client
///
/// Method URLs embed the bot token, so they are never logged and errors are
/// stripped of their URL before being returned.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    method_base: SecretString,
    file_base: SecretString,
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_parameters: Option<ReplyParameters>,
}

#[derive(Serialize)]
struct ReplyParameters {
    message_id: i64,
    allow_sending_without_reply: bool,
}

#[derive(Serialize)]
struct DeleteMessage {
    chat_id: i64,
    message_id: i64,
}

#[derive(Serialize)]
struct GetFile<'a> {
    file_id: &'a str,
}

#[derive(Serialize)]
struct SetMyCommands<'a> {
    commands: &'a [BotCommand],
}

#[derive(Serialize)]
struct SetWebhook<'a> {
    url: &'a str,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct DeleteWebhook {
    drop_pending_updates: bool,
}

const ALLOWED_UPDATES: &[&str] = &["message"];

impl TelegramClient {
    /// Create a client for `api_url` (e.g. `https://api.telegram.org`)
    ///
    /// `poll_timeout` sizes the HTTP timeout so long polls are not cut short.
    pub fn new(api_url: &str, token: &SecretString, poll_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(poll_timeout + POLL_GRACE)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| TelegramError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        let api_url = api_url.trim_end_matches('/');

        Ok(Self {
            client,
            method_base: SecretString::from(format!("{api_url}/bot{}", token.expose_secret())),
            file_base: SecretString::from(format!("{api_url}/file/bot{}", token.expose_secret())),
        })
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T>
    where
        P: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{method}", self.method_base.expose_secret());

        let response = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| TelegramError::ConnectionError {
                method: method.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();

        let body: ApiResponse<T> = response.json().await.map_err(|e| TelegramError::InvalidResponse {
            method: method.to_string(),
            message: format!("status {status}: {}", e.without_url()),
        })?;

        if !body.ok {
            return Err(TelegramError::ApiError {
                method: method.to_string(),
                code: body.error_code,
                description: body.description.unwrap_or_default(),
            });
        }

        body.result.ok_or_else(|| TelegramError::InvalidResponse {
            method: method.to_string(),
            message: "missing result".to_string(),
        })
    }

    /// Long-poll for new updates
    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let params = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &params).await
    }

    /// Send a text message, optionally as a reply
    pub async fn send_message(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Result<Message> {
        let params = SendMessage {
            chat_id,
            text,
            reply_parameters: reply_to.map(|message_id| ReplyParameters {
                message_id,
                allow_sending_without_reply: true,
            }),
        };
        self.call("sendMessage", &params).await
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool> {
        self.call("deleteMessage", &DeleteMessage { chat_id, message_id }).await
    }

    /// Resolve a file id to a downloadable path
    pub async fn get_file(&self, file_id: &str) -> Result<File> {
        self.call("getFile", &GetFile { file_id }).await
    }

    /// Download a file previously resolved with [`TelegramClient::get_file`]
    pub async fn download_file(&self, file_path: &str) -> Result<Bytes> {
        const METHOD: &str = "downloadFile";

        let url = format!("{}/{file_path}", self.file_base.expose_secret());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TelegramError::ConnectionError {
                method: METHOD.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::ApiError {
                method: METHOD.to_string(),
                code: Some(i32::from(status.as_u16())),
                description: status.canonical_reason().unwrap_or("download failed").to_string(),
            });
        }

        response.bytes().await.map_err(|e| TelegramError::ConnectionError {
            method: METHOD.to_string(),
            message: e.without_url().to_string(),
        })
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<bool> {
        self.call("setMyCommands", &SetMyCommands { commands }).await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<bool> {
        let params = SetWebhook {
            url,
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("setWebhook", &params).await
    }

    /// Remove the webhook, optionally discarding updates queued while offline
    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<bool> {
        self.call("deleteWebhook", &DeleteWebhook { drop_pending_updates })
            .await
    }
}
