pub(crate) mod elevenlabs;
pub(crate) mod whisper;

use async_trait::async_trait;

use crate::{
    error::AdapterError,
    types::{ProviderId, TranscriptionRequest},
};

/// Uniform call wrapper around one remote transcription service
#[async_trait]
pub trait SttProvider: Send + Sync {
    /// Transcribe audio to text
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<String, AdapterError>;

    /// Which slot this provider fills
    fn id(&self) -> ProviderId;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Read a failed response body and turn it into a classified error
///
/// Logging is left to the caller, which sees every attempt.
pub(crate) async fn error_from_response(provider: ProviderId, response: reqwest::Response) -> AdapterError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

    AdapterError::from_status(provider, status.as_u16(), error_text)
}
