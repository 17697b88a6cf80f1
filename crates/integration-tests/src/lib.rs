//! End-to-end tests for the transcription gateway live under `tests/`
