use std::sync::Arc;

use bytes::Bytes;
use voxbridge_config::{DowngradePolicy, SttConfig};

use crate::{
    classify,
    error::{AdapterError, AdapterErrorKind, Result, SttError},
    http_client::http_client,
    provider::{SttProvider, elevenlabs::ElevenLabsProvider, whisper::WhisperProvider},
    state::ControllerState,
    types::{DEFAULT_LANGUAGE, ProviderId, TranscriptionOutcome, TranscriptionRequest},
};

/// Chooses the transcription provider, falls back within a request and
/// demotes the primary provider when it proves unusable
///
/// Every call to [`FailoverController::transcribe`] makes at most two provider
/// calls: the active provider, then the alternate if it has a credential.
/// A provider without a credential is never constructed, so it can be
/// neither active nor a fallback target.
pub struct FailoverController {
    primary: Option<Arc<dyn SttProvider>>,
    secondary: Option<Arc<dyn SttProvider>>,
    state: ControllerState,
    policy: DowngradePolicy,
    default_language: String,
}

impl FailoverController {
    /// Create a controller from already-built providers
    ///
    /// The primary provider starts active when present.
    ///
    /// # Errors
    ///
    /// Returns `SttError::ConfigError` when neither provider is given or a
    /// provider is placed in the wrong slot
    pub fn new(
        primary: Option<Arc<dyn SttProvider>>,
        secondary: Option<Arc<dyn SttProvider>>,
        policy: DowngradePolicy,
    ) -> Result<Self> {
        for (slot, provider) in [(ProviderId::Primary, &primary), (ProviderId::Secondary, &secondary)] {
            if let Some(provider) = provider
                && provider.id() != slot
            {
                return Err(SttError::ConfigError(format!(
                    "provider '{}' cannot be used as the {slot} provider",
                    provider.name()
                )));
            }
        }

        let initial = match (&primary, &secondary) {
            (Some(_), _) => ProviderId::Primary,
            (None, Some(_)) => ProviderId::Secondary,
            (None, None) => {
                return Err(SttError::ConfigError(
                    "no transcription provider credentials configured (set OPENAI_API_KEY or ELEVENLABS_API_KEY)"
                        .to_string(),
                ));
            }
        };

        Ok(Self {
            primary,
            secondary,
            state: ControllerState::new(initial),
            policy,
            default_language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    /// Build the controller and its HTTP providers from configuration
    ///
    /// # Errors
    ///
    /// Returns `SttError::ConfigError` when no provider has a key or the
    /// request timeout is invalid
    pub fn from_config(config: &SttConfig) -> Result<Self> {
        let timeout = config
            .request_timeout()
            .map_err(|e| SttError::ConfigError(e.to_string()))?;
        let client = http_client(timeout)?;

        let primary = config.primary_with_key().and_then(|p| {
            p.api_key.clone().map(|key| {
                Arc::new(WhisperProvider::new(
                    client.clone(),
                    key,
                    p.base_url.clone(),
                    p.model.clone(),
                    p.temp_dir.clone(),
                )) as Arc<dyn SttProvider>
            })
        });

        let secondary = config.secondary_with_key().and_then(|p| {
            p.api_key.clone().map(|key| {
                Arc::new(ElevenLabsProvider::new(
                    client.clone(),
                    key,
                    p.base_url.clone(),
                    p.model.clone(),
                )) as Arc<dyn SttProvider>
            })
        });

        let controller = Self::new(primary, secondary, config.downgrade)?.with_default_language(config.language.clone());

        tracing::info!(
            primary = controller.primary.as_ref().map(|p| p.name()),
            secondary = controller.secondary.as_ref().map(|p| p.name()),
            active = %controller.active_provider(),
            policy = ?controller.policy,
            "transcription controller initialized"
        );

        Ok(controller)
    }

    /// Override the language used by [`FailoverController::transcribe_default`]
    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Provider new requests currently start with
    pub fn active_provider(&self) -> ProviderId {
        self.state.active()
    }

    /// Whether a provider has a credential and can be called
    pub fn has_provider(&self, id: ProviderId) -> bool {
        self.provider(id).is_some()
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    fn provider(&self, id: ProviderId) -> Option<&Arc<dyn SttProvider>> {
        match id {
            ProviderId::Primary => self.primary.as_ref(),
            ProviderId::Secondary => self.secondary.as_ref(),
        }
    }

    /// Transcribe with the configured default language
    pub async fn transcribe_default(&self, audio: Bytes) -> TranscriptionOutcome {
        self.transcribe(audio, &self.default_language).await
    }

    /// Transcribe audio, falling back to the alternate provider once
    ///
    /// Never fails: every path ends in a success or in a user-facing failure
    /// message. Raw provider errors are only logged.
    pub async fn transcribe(&self, audio: Bytes, language: &str) -> TranscriptionOutcome {
        let request = match TranscriptionRequest::new(audio, language) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("rejecting transcription request: {e}");
                return TranscriptionOutcome::failure(e.to_string());
            }
        };

        let active = self.state.active();
        let mut last_error: Option<AdapterError> = None;

        for id in [active, active.other()] {
            let Some(provider) = self.provider(id) else {
                continue;
            };

            if let Some(previous) = &last_error {
                tracing::info!(
                    from = %previous.provider,
                    to = %id,
                    "falling back to alternate provider for this request"
                );
            }

            match provider.transcribe(&request).await {
                Ok(text) => {
                    tracing::debug!(provider = %id, chars = text.chars().count(), "transcription succeeded");
                    return TranscriptionOutcome::success(text);
                }
                Err(error) => {
                    tracing::warn!(
                        provider = %id,
                        kind = ?error.kind,
                        status = ?error.status,
                        "transcription attempt failed: {}",
                        error.message
                    );
                    self.record_failure(&error);
                    last_error = Some(error);
                }
            }
        }

        // The last failure observed is the one reported
        let kind = last_error.map_or(AdapterErrorKind::Unknown, |e| e.kind);
        TranscriptionOutcome::failure(kind.user_message())
    }

    /// Demote the primary provider when the policy says this failure warrants it
    fn record_failure(&self, error: &AdapterError) {
        if error.provider != ProviderId::Primary || self.secondary.is_none() {
            return;
        }

        let demote = match self.policy {
            DowngradePolicy::AnyError => true,
            DowngradePolicy::UnusableOnly => classify::is_disqualifying(error),
        };

        if demote && self.state.downgrade() {
            tracing::warn!(
                kind = ?error.kind,
                "primary provider downgraded, secondary provider is now active"
            );
        }
    }
}
