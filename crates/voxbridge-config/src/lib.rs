#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod server;
pub mod stt;
pub mod telegram;
pub mod telemetry;

use std::time::Duration;

use serde::Deserialize;

pub use server::*;
pub use stt::*;
pub use telegram::*;
pub use telemetry::*;

/// Top-level voxbridge configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP listener used by webhook mode and the health endpoint
    #[serde(default)]
    pub server: ServerConfig,
    /// Telegram Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Transcription provider configuration
    #[serde(default)]
    pub stt: SttConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Parse a human-readable duration such as `"30s"` or `"2m"`
///
/// # Errors
///
/// Returns an error if the string is not a valid duration
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration '{value}': {e}"))
}
