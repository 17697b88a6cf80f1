use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;

use crate::{Config, SttProviderConfig, TransportMode};

/// Read a variable, treating unset and blank values alike
fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Apply the conventional deployment environment variables on top of the file
    ///
    /// `BOT_TOKEN`, `OPENAI_API_KEY` and `ELEVENLABS_API_KEY` fill credentials,
    /// `RENDER` switches to webhook mode, `WEBHOOK_HOST` sets the public URL and
    /// `PORT` rebinds the listener to `0.0.0.0:$PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a valid port number
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Some(token) = var("BOT_TOKEN") {
            self.telegram.bot_token = Some(SecretString::from(token));
        }

        if let Some(key) = var("OPENAI_API_KEY") {
            self.stt.primary.get_or_insert_with(SttProviderConfig::default).api_key = Some(SecretString::from(key));
        }

        if let Some(key) = var("ELEVENLABS_API_KEY") {
            self.stt.secondary.get_or_insert_with(SttProviderConfig::default).api_key = Some(SecretString::from(key));
        }

        if var("RENDER").is_some() {
            tracing::debug!("RENDER is set, using webhook transport");
            self.telegram.mode = TransportMode::Webhook;
        }

        if let Some(host) = var("WEBHOOK_HOST") {
            self.telegram.webhook_host = Some(host);
        }

        if let Some(port) = var("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT value '{port}': {e}"))?;
            self.server.listen_address = Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
        }

        Ok(())
    }
}
