use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use stt::{FailoverController, TranscriptionOutcome};
use tokio_util::task::TaskTracker;

use crate::{
    client::TelegramClient,
    error::{Result, TelegramError},
    types::{BotCommand, FileRef, Message, Update},
};

/// Telegram rejects messages longer than this many UTF-16 code units
pub const MAX_MESSAGE_UNITS: usize = 4096;

/// `getFile` only serves files up to 20 MB
pub const MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;

const START_TEXT: &str = "👋 Hi! I turn voice messages into text.\n\n\
    Send me a voice message or an audio file and I will reply with its transcription.";

const HELP_TEXT: &str = "Send a voice message or an audio file and I will reply with the recognized text.\n\n\
    /start - start the bot\n/help - show this help";

const VOICE_NOTICE: &str = "🔍 Processing voice message...";
const AUDIO_NOTICE: &str = "🔍 Processing audio file...";
const NO_SPEECH_TEXT: &str = "🤷 No speech was recognized in this message.";
const DOWNLOAD_FAILED_TEXT: &str = "❌ Could not download the file from Telegram. Please try again.";
const TOO_LARGE_TEXT: &str = "❌ The file is too large. Telegram bots can download files up to 20 MB.";

/// Commands registered with `setMyCommands`
pub fn commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Start the bot"),
        BotCommand::new("help", "Show help"),
    ]
}

/// Handles updates: commands, voice messages and audio files
pub struct Bot {
    client: TelegramClient,
    controller: Arc<FailoverController>,
    tasks: TaskTracker,
}

impl Bot {
    pub fn new(client: TelegramClient, controller: Arc<FailoverController>) -> Self {
        Self {
            client,
            controller,
            tasks: TaskTracker::new(),
        }
    }

    pub const fn client(&self) -> &TelegramClient {
        &self.client
    }

    /// Register the command list shown in Telegram clients
    pub async fn register_commands(&self) -> Result<()> {
        self.client.set_my_commands(&commands()).await?;
        tracing::debug!("bot commands registered");
        Ok(())
    }

    /// Handle an update on its own task
    pub fn spawn_update(self: &Arc<Self>, update: Update) {
        let bot = Arc::clone(self);
        self.tasks.spawn(async move {
            bot.handle_update(update).await;
        });
    }

    /// Wait for in-flight updates to finish, giving up after `timeout`
    pub async fn drain(&self, timeout: Duration) {
        self.tasks.close();

        if tokio::time::timeout(timeout, self.tasks.wait()).await.is_err() {
            tracing::warn!(
                pending = self.tasks.len(),
                "abandoning in-flight updates after shutdown timeout"
            );
        }
    }

    /// Handle a single update
    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            tracing::trace!(update_id = update.update_id, "ignoring update without message");
            return;
        };

        if let Some(text) = message.text.as_deref() {
            self.handle_command(&message, text).await;
        } else if let Some(voice) = &message.voice {
            self.handle_audio(&message, voice, VOICE_NOTICE).await;
        } else if let Some(audio) = &message.audio {
            self.handle_audio(&message, audio, AUDIO_NOTICE).await;
        }
    }

    async fn handle_command(&self, message: &Message, text: &str) {
        let reply = match parse_command(text) {
            Some("start") => START_TEXT,
            Some("help") => HELP_TEXT,
            _ => return,
        };

        if let Err(e) = self.client.send_message(message.chat.id, reply, None).await {
            tracing::error!(chat_id = message.chat.id, "failed to answer command: {e}");
        }
    }

    async fn handle_audio(&self, message: &Message, file: &FileRef, notice: &str) {
        let chat_id = message.chat.id;

        let notice_id = match self.client.send_message(chat_id, notice, None).await {
            Ok(sent) => Some(sent.message_id),
            Err(e) => {
                tracing::warn!(chat_id, "failed to send processing notice: {e}");
                None
            }
        };

        let reply = self.transcribe_file(file).await;

        for chunk in split_message(&reply, MAX_MESSAGE_UNITS) {
            if let Err(e) = self.client.send_message(chat_id, chunk, Some(message.message_id)).await {
                tracing::error!(chat_id, "failed to deliver transcription: {e}");
                break;
            }
        }

        if let Some(notice_id) = notice_id
            && let Err(e) = self.client.delete_message(chat_id, notice_id).await
        {
            tracing::warn!(chat_id, "failed to delete processing notice: {e}");
        }
    }

    /// Produce the reply text for an audio attachment
    async fn transcribe_file(&self, file: &FileRef) -> String {
        if file.file_size.is_some_and(|size| size > MAX_DOWNLOAD_BYTES) {
            return TOO_LARGE_TEXT.to_string();
        }

        let audio = match self.download(&file.file_id).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::error!(file_id = %file.file_id, "failed to download audio: {e}");
                return DOWNLOAD_FAILED_TEXT.to_string();
            }
        };

        match self.controller.transcribe_default(audio).await {
            TranscriptionOutcome::Success { text } if text.trim().is_empty() => NO_SPEECH_TEXT.to_string(),
            TranscriptionOutcome::Success { text } => text,
            TranscriptionOutcome::Failure { user_message } => format!("❌ {user_message}"),
        }
    }

    async fn download(&self, file_id: &str) -> Result<Bytes> {
        let file = self.client.get_file(file_id).await?;

        let path = file.file_path.ok_or_else(|| TelegramError::InvalidResponse {
            method: "getFile".to_string(),
            message: "file has no file_path".to_string(),
        })?;

        self.client.download_file(&path).await
    }
}

/// Extract the command name from `/name@bot args`
fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    let name = command.split_once('@').map_or(command, |(name, _)| name);
    (!name.is_empty()).then_some(name)
}

/// Split text into chunks of at most `max_units` UTF-16 code units
///
/// Chunks always end on a character boundary.
fn split_message(text: &str, max_units: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut units = 0;

    for (i, c) in text.char_indices() {
        let len = c.len_utf16();
        if units + len > max_units && i > start {
            chunks.push(&text[start..i]);
            start = i;
            units = 0;
        }
        units += len;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}
