#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

//! Transcription provider failover
//!
//! Wraps a Whisper-compatible primary provider and an ElevenLabs-compatible
//! secondary provider behind [`FailoverController::transcribe`], which always
//! resolves to a [`TranscriptionOutcome`].

pub mod classify;
mod controller;
mod error;
mod http_client;
mod provider;
mod state;
mod types;

pub use controller::FailoverController;
pub use error::{AdapterError, AdapterErrorKind, Result, SttError};
pub use provider::SttProvider;
pub use state::ControllerState;
pub use types::{DEFAULT_LANGUAGE, ProviderId, TranscriptionOutcome, TranscriptionRequest};
