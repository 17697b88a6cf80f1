use async_trait::async_trait;
use reqwest::{
    Body, Client,
    multipart::{Form, Part},
};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::AdapterError,
    types::{ProviderId, TranscriptionRequest},
};

use super::{SttProvider, error_from_response};

const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
const DEFAULT_MODEL: &str = "scribe_v1";

/// `ElevenLabs` speech-to-text provider
pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl ElevenLabsProvider {
    pub fn new(client: Client, api_key: SecretString, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_ELEVENLABS_API_URL.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[derive(serde::Deserialize)]
struct ElevenLabsResponse {
    text: String,
}

#[async_trait]
impl SttProvider for ElevenLabsProvider {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<String, AdapterError> {
        let url = format!("{}/speech-to-text", self.base_url);

        tracing::debug!(
            "ElevenLabs transcription request: {} bytes, model={}, language={}",
            request.audio.len(),
            self.model,
            request.language,
        );

        let part = Part::stream_with_length(Body::from(request.audio.clone()), request.audio.len() as u64)
            .file_name("voice.ogg")
            .mime_str("audio/ogg")
            .map_err(|e| AdapterError::from_message(ProviderId::Secondary, format!("invalid content type: {e}")))?;

        let form = Form::new()
            .part("file", part)
            .text("model_id", self.model.clone())
            .text("language_code", request.language.clone());

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret().to_string())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(ProviderId::Secondary, &e))?;

        if !response.status().is_success() {
            return Err(error_from_response(ProviderId::Secondary, response).await);
        }

        let result: ElevenLabsResponse = response.json().await.map_err(|e| {
            AdapterError::from_message(ProviderId::Secondary, format!("unexpected response shape: {e}"))
        })?;

        tracing::debug!("ElevenLabs transcription complete");

        Ok(result.text)
    }

    fn id(&self) -> ProviderId {
        ProviderId::Secondary
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}
