use secrecy::SecretString;
use serde::Deserialize;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`
    #[serde(default)]
    pub bot_token: Option<SecretString>,
    /// How updates are received
    #[serde(default)]
    pub mode: TransportMode,
    /// Public base URL the webhook is registered under (webhook mode only)
    #[serde(default)]
    pub webhook_host: Option<String>,
    /// Bot API base URL override
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Long-poll timeout passed to `getUpdates`
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            mode: TransportMode::default(),
            webhook_host: None,
            api_url: default_api_url(),
            poll_timeout: default_poll_timeout(),
        }
    }
}

/// Update delivery transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// `getUpdates` long polling
    #[default]
    Polling,
    /// Telegram pushes updates to an HTTP endpoint
    Webhook,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_timeout() -> String {
    "30s".to_string()
}
