#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Telegram front end for the transcription controller
//!
//! Receives voice messages and audio files over long polling or a webhook,
//! downloads them and replies with the transcription.

mod bot;
mod client;
mod error;
mod polling;
pub mod types;
mod webhook;

pub use bot::{Bot, MAX_DOWNLOAD_BYTES, MAX_MESSAGE_UNITS, commands};
pub use client::TelegramClient;
pub use error::{Result, TelegramError};
pub use polling::run_polling;
pub use webhook::{WebhookOptions, router, run_webhook, webhook_url};
