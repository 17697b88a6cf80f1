use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{
    Body, Client,
    multipart::{Form, Part},
};
use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;

use crate::{
    error::AdapterError,
    types::{ProviderId, TranscriptionRequest},
};

use super::{SttProvider, error_from_response};

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "whisper-1";

/// `OpenAI` Whisper STT provider
///
/// The audio is spooled to a temporary file and streamed from disk. The file
/// is owned by the request future, so it is removed on success, on error and
/// when the future is dropped mid-flight.
pub struct WhisperProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temp_dir: Option<PathBuf>,
}

impl WhisperProvider {
    pub fn new(
        client: Client,
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        temp_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temp_dir,
        }
    }

    async fn spool(&self, audio: &[u8]) -> Result<NamedTempFile, AdapterError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("voxbridge-").suffix(".ogg");

        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| AdapterError::from_message(ProviderId::Primary, format!("failed to create temporary audio file: {e}")))?;

        tokio::fs::write(file.path(), audio)
            .await
            .map_err(|e| AdapterError::from_message(ProviderId::Primary, format!("failed to write temporary audio file: {e}")))?;

        Ok(file)
    }

    async fn send(&self, path: &Path, request: &TranscriptionRequest) -> Result<String, AdapterError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| AdapterError::from_message(ProviderId::Primary, format!("failed to open temporary audio file: {e}")))?;

        let part = Part::stream_with_length(Body::from(file), request.audio.len() as u64)
            .file_name("voice.ogg")
            .mime_str("audio/ogg")
            .map_err(|e| AdapterError::from_message(ProviderId::Primary, format!("invalid content type: {e}")))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", request.language.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(ProviderId::Primary, &e))?;

        if !response.status().is_success() {
            return Err(error_from_response(ProviderId::Primary, response).await);
        }

        let text = response.text().await.map_err(|e| AdapterError::from_transport(ProviderId::Primary, &e))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl SttProvider for WhisperProvider {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<String, AdapterError> {
        tracing::debug!(
            "Whisper transcription request: {} bytes, model={}, language={}",
            request.audio.len(),
            self.model,
            request.language,
        );

        let file = self.spool(&request.audio).await?;
        let result = self.send(file.path(), request).await;

        if let Err(e) = file.close() {
            tracing::warn!("failed to remove temporary audio file: {e}");
        }

        if result.is_ok() {
            tracing::debug!("Whisper transcription complete");
        }

        result
    }

    fn id(&self) -> ProviderId {
        ProviderId::Primary
    }

    fn name(&self) -> &str {
        "whisper"
    }
}
