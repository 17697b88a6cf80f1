use thiserror::Error;

pub type Result<T> = std::result::Result<T, TelegramError>;

/// Bot API client errors
///
/// Messages never contain request URLs, which embed the bot token.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Network or connection error
    #[error("Connection error calling {method}: {message}")]
    ConnectionError { method: String, message: String },

    /// The Bot API answered with `ok: false`
    #[error("Bot API error in {method} ({code:?}): {description}")]
    ApiError {
        method: String,
        code: Option<i32>,
        description: String,
    },

    /// The response could not be decoded
    #[error("Invalid response from {method}: {message}")]
    InvalidResponse { method: String, message: String },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
