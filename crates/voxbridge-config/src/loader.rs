use std::path::Path;

use crate::{Config, TransportMode};

impl Config {
    /// Load configuration
    ///
    /// Parses the TOML file when a path is given, otherwise starts from
    /// defaults, then applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails,
    /// an environment override is malformed, or validation fails
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
                Self::parse(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string without validation
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or contains unknown fields
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Validate that the configuration is internally consistent
    ///
    /// Credential presence is checked by the components that need it:
    /// the binary requires a bot token and the transcription controller
    /// requires at least one provider key.
    ///
    /// # Errors
    ///
    /// Returns an error if webhook mode lacks a host, a duration is malformed
    /// or the health path is not a usable route
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server_config()?;
        self.validate_telegram_config()?;
        self.validate_stt_config()?;
        Ok(())
    }

    fn validate_server_config(&self) -> anyhow::Result<()> {
        let health = &self.server.health;
        if !health.enabled {
            return Ok(());
        }

        let path = &health.path;

        if !path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/', got {path:?}");
        }

        if path == "/webhook" || path.starts_with("/webhook/") {
            anyhow::bail!("server.health.path must not overlap the webhook route, got {path:?}");
        }

        Ok(())
    }

    fn validate_telegram_config(&self) -> anyhow::Result<()> {
        if self.telegram.mode == TransportMode::Webhook
            && self.telegram.webhook_host.as_deref().is_none_or(|h| h.trim().is_empty())
        {
            anyhow::bail!("telegram.webhook_host is required when telegram.mode is \"webhook\"");
        }

        crate::parse_duration(&self.telegram.poll_timeout)
            .map_err(|e| anyhow::anyhow!("telegram.poll_timeout: {e}"))?;

        Ok(())
    }

    fn validate_stt_config(&self) -> anyhow::Result<()> {
        self.stt
            .request_timeout()
            .map_err(|e| anyhow::anyhow!("stt.request_timeout: {e}"))?;

        if self.stt.language.trim().is_empty() {
            anyhow::bail!("stt.language must not be empty");
        }

        Ok(())
    }
}
