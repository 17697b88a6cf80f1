use std::{path::PathBuf, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Top-level STT configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SttConfig {
    /// Language hint sent with every request unless the caller overrides it
    #[serde(default = "default_language")]
    pub language: String,
    /// Per-request timeout for provider calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// When a primary failure demotes the primary provider
    #[serde(default)]
    pub downgrade: DowngradePolicy,
    /// Whisper-compatible provider, preferred when it has a key
    #[serde(default)]
    pub primary: Option<SttProviderConfig>,
    /// ElevenLabs-compatible provider
    #[serde(default)]
    pub secondary: Option<SttProviderConfig>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            request_timeout: default_request_timeout(),
            downgrade: DowngradePolicy::default(),
            primary: None,
            secondary: None,
        }
    }
}

impl SttConfig {
    /// Parsed provider request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if `request_timeout` is not a valid duration
    pub fn request_timeout(&self) -> anyhow::Result<Duration> {
        crate::parse_duration(&self.request_timeout)
    }

    /// Primary provider settings, only if a non-empty key is present
    pub fn primary_with_key(&self) -> Option<&SttProviderConfig> {
        self.primary.as_ref().filter(|p| p.has_api_key())
    }

    /// Secondary provider settings, only if a non-empty key is present
    pub fn secondary_with_key(&self) -> Option<&SttProviderConfig> {
        self.secondary.as_ref().filter(|p| p.has_api_key())
    }
}

/// Configuration for a single STT provider
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SttProviderConfig {
    /// API key
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model identifier override
    #[serde(default)]
    pub model: Option<String>,
    /// Directory for temporary audio files, defaults to the system temp dir
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl SttProviderConfig {
    /// Whether a usable (non-empty) API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

/// Which primary failures demote the primary provider for the rest of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DowngradePolicy {
    /// Any failed primary call switches to the secondary provider
    #[default]
    AnyError,
    /// Only authorization, quota, or abuse-block failures switch providers
    UnusableOnly,
}

fn default_language() -> String {
    "ru".to_string()
}

fn default_request_timeout() -> String {
    "120s".to_string()
}
