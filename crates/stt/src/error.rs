use thiserror::Error;

use crate::{classify, types::ProviderId};

pub type Result<T> = std::result::Result<T, SttError>;

/// Errors surfaced by the STT crate outside of a transcription outcome
#[derive(Debug, Error)]
pub enum SttError {
    /// No usable provider credential, or a provider could not be built
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request carried no audio
    #[error("audio empty or unreadable")]
    EmptyAudio,
}

/// Normalized failure class of a provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    RateLimited,
    Unauthorized,
    QuotaOrAbuseBlocked,
    TransientServerError,
    Unknown,
}

impl AdapterErrorKind {
    /// Message shown to the end user for this class of failure
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::RateLimited => "Speech recognition is busy right now (rate limit). Please try again in a minute.",
            Self::Unauthorized => "Speech recognition is not authorized. Please contact the bot administrator.",
            Self::QuotaOrAbuseBlocked => "Speech recognition quota is exhausted. Please try again later.",
            Self::TransientServerError => "Speech recognition service is temporarily unavailable. Please try again later.",
            Self::Unknown => "Sorry, the audio could not be transcribed. Please try again later.",
        }
    }
}

/// Failed provider call
///
/// `message` holds the raw provider text and is only meant for logs.
#[derive(Debug, Clone, Error)]
#[error("{provider} provider failed ({kind:?}, status {status:?}): {message}")]
pub struct AdapterError {
    pub provider: ProviderId,
    pub kind: AdapterErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl AdapterError {
    /// Non-success HTTP response
    pub fn from_status(provider: ProviderId, status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = classify::classify(&classify::Signal {
            status: Some(status),
            message: &message,
            transport: false,
        });

        Self {
            provider,
            kind,
            status: Some(status),
            message,
        }
    }

    /// Request never produced a response
    pub fn from_transport(provider: ProviderId, err: &reqwest::Error) -> Self {
        let message = err.to_string();
        let kind = classify::classify(&classify::Signal {
            status: err.status().map(|s| s.as_u16()),
            message: &message,
            transport: err.is_timeout() || err.is_connect() || err.is_request(),
        });

        Self {
            provider,
            kind,
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// Local or decoding failure without an HTTP status
    pub fn from_message(provider: ProviderId, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = classify::classify(&classify::Signal {
            status: None,
            message: &message,
            transport: false,
        });

        Self {
            provider,
            kind,
            status: None,
            message,
        }
    }

    /// Message safe to expose to the end user
    pub const fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}
