use std::fmt;

use bytes::Bytes;

use crate::error::SttError;

/// Language hint used when the caller does not provide one
pub const DEFAULT_LANGUAGE: &str = "ru";

/// One of the two transcription backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProviderId {
    /// Whisper-compatible API, preferred when configured
    Primary = 0,
    /// ElevenLabs-compatible API
    Secondary = 1,
}

impl ProviderId {
    /// The provider a request falls back to
    pub const fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        if value == Self::Primary as u8 {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated audio payload plus language hint for a single transcription
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// Raw audio exactly as received, cheap to clone between attempts
    pub audio: Bytes,
    /// Language hint passed through verbatim
    pub language: String,
}

impl TranscriptionRequest {
    /// Build a request, rejecting empty audio
    pub fn new(audio: Bytes, language: impl Into<String>) -> crate::error::Result<Self> {
        if audio.is_empty() {
            return Err(SttError::EmptyAudio);
        }

        Ok(Self {
            audio,
            language: language.into(),
        })
    }
}

/// Final result handed back to the chat layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionOutcome {
    /// Recognized text
    Success { text: String },
    /// Short message safe to show to the end user
    Failure { user_message: String },
}

impl TranscriptionOutcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    pub fn failure(user_message: impl Into<String>) -> Self {
        Self::Failure {
            user_message: user_message.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
