//! Programmatic configuration builder for integration tests

use std::path::Path;

use secrecy::SecretString;
use voxbridge_config::{DowngradePolicy, SttConfig, SttProviderConfig};

/// Builder for transcription configurations pointed at mock backends
pub struct SttConfigBuilder {
    config: SttConfig,
}

impl SttConfigBuilder {
    /// Create a builder with no providers and a short timeout
    pub fn new() -> Self {
        Self {
            config: SttConfig {
                request_timeout: "5s".to_owned(),
                ..SttConfig::default()
            },
        }
    }

    /// Add the Whisper-style primary provider
    pub fn with_primary(mut self, base_url: &str) -> Self {
        self.config.primary = Some(provider("sk-test", base_url));
        self
    }

    /// Add the ElevenLabs-style secondary provider
    pub fn with_secondary(mut self, base_url: &str) -> Self {
        self.config.secondary = Some(provider("xi-test", base_url));
        self
    }

    /// Spool primary audio into `dir`
    pub fn with_temp_dir(mut self, dir: &Path) -> Self {
        if let Some(primary) = self.config.primary.as_mut() {
            primary.temp_dir = Some(dir.to_path_buf());
        }
        self
    }

    pub fn with_policy(mut self, policy: DowngradePolicy) -> Self {
        self.config.downgrade = policy;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.config.language = language.to_owned();
        self
    }

    pub fn build(self) -> SttConfig {
        self.config
    }
}

fn provider(key: &str, base_url: &str) -> SttProviderConfig {
    SttProviderConfig {
        api_key: Some(SecretString::from(key)),
        base_url: Some(base_url.to_owned()),
        model: None,
        temp_dir: None,
    }
}
