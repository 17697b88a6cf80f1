//! Mock transcription backend for integration tests
//!
//! Serves both the Whisper-style `/v1/audio/transcriptions` and the
//! ElevenLabs-style `/v1/speech-to-text` endpoints with scripted responses

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing};
use tokio_util::sync::CancellationToken;

/// Canned HTTP response
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    body: String,
    content_type: &'static str,
}

impl MockResponse {
    /// Plain-text success, as returned by Whisper with `response_format=text`
    pub fn text(text: &str) -> Self {
        Self {
            status: 200,
            body: format!("{text}\n"),
            content_type: "text/plain; charset=utf-8",
        }
    }

    /// JSON success with a `text` field, as returned by ElevenLabs
    pub fn json_text(text: &str) -> Self {
        Self {
            status: 200,
            body: serde_json::json!({ "language_code": "rus", "text": text }).to_string(),
            content_type: "application/json",
        }
    }

    /// Error response with a raw body
    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            content_type: "application/json",
        }
    }
}

/// Mock transcription server
pub struct MockStt {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockSttState>,
}

struct MockSttState {
    call_count: AtomicU32,
    /// Responses served in order before falling back to `default`
    script: Mutex<VecDeque<MockResponse>>,
    default: MockResponse,
    delay: Option<Duration>,
    /// Multipart fields and auth headers of the last request
    last_request: Mutex<HashMap<String, String>>,
}

impl MockStt {
    /// Start a server that always answers with `response`
    pub async fn start(response: MockResponse) -> anyhow::Result<Self> {
        Self::start_inner(Vec::new(), response, None).await
    }

    /// Start a server that serves `script` first, then `default`
    pub async fn start_scripted(script: Vec<MockResponse>, default: MockResponse) -> anyhow::Result<Self> {
        Self::start_inner(script, default, None).await
    }

    /// Start a server that waits `delay` before answering
    pub async fn start_slow(response: MockResponse, delay: Duration) -> anyhow::Result<Self> {
        Self::start_inner(Vec::new(), response, Some(delay)).await
    }

    async fn start_inner(
        script: Vec<MockResponse>,
        default: MockResponse,
        delay: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let state = Arc::new(MockSttState {
            call_count: AtomicU32::new(0),
            script: Mutex::new(script.into()),
            default,
            delay,
            last_request: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/v1/audio/transcriptions", routing::post(handle_transcription))
            .route("/v1/speech-to-text", routing::post(handle_transcription))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    ///
    /// Includes `/v1` since providers append paths like `/speech-to-text`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of transcription requests received
    pub fn call_count(&self) -> u32 {
        self.state.call_count.load(Ordering::SeqCst)
    }

    /// A multipart field or auth header (`header:<name>`) of the last request
    pub fn last_field(&self, name: &str) -> Option<String> {
        self.state.last_request.lock().unwrap().get(name).cloned()
    }
}

impl Drop for MockStt {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_transcription(
    State(state): State<Arc<MockSttState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.call_count.fetch_add(1, Ordering::SeqCst);

    let mut fields = HashMap::new();

    for name in ["authorization", "xi-api-key"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            fields.insert(format!("header:{name}"), value.to_owned());
        }
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "file" {
            let bytes = field.bytes().await.unwrap_or_default();
            fields.insert("file_len".to_owned(), bytes.len().to_string());
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }

    *state.last_request.lock().unwrap() = fields;

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let response = state
        .script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| state.default.clone());

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, [(header::CONTENT_TYPE, response.content_type)], response.body).into_response()
}
