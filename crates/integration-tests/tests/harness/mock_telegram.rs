//! Mock Telegram Bot API for integration tests
//!
//! Records outgoing method calls and serves queued updates and one
//! downloadable file.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Bot token the mock accepts
pub const TOKEN: &str = "123456:test-token";

/// Path returned by `getFile`
pub const FILE_PATH: &str = "voice/file_0.oga";

/// A `sendMessage` call as seen by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub text: String,
    pub reply_to: Option<i64>,
}

/// Mock Bot API server
pub struct MockTelegram {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockTelegramState>,
}

struct MockTelegramState {
    methods: Mutex<Vec<String>>,
    sent: Mutex<Vec<SentMessage>>,
    deleted: Mutex<Vec<i64>>,
    webhook_url: Mutex<Option<String>>,
    updates: Mutex<VecDeque<Value>>,
    /// Contents served at [`FILE_PATH`], `None` answers 404
    file: Option<Vec<u8>>,
    next_message_id: AtomicI64,
}

impl MockTelegram {
    /// Start a server whose file endpoint serves `file`
    pub async fn start(file: Option<Vec<u8>>) -> anyhow::Result<Self> {
        let state = Arc::new(MockTelegramState {
            methods: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            webhook_url: Mutex::new(None),
            updates: Mutex::new(VecDeque::new()),
            file,
            next_message_id: AtomicI64::new(1000),
        });

        let app = Router::new()
            .route("/{bot}/{method}", routing::post(handle_method))
            .route("/file/{bot}/{*path}", routing::get(handle_file))
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

    /// API root to pass to the client (without `/bot<token>`)
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue an update for the next `getUpdates`
    pub fn push_update(&self, update: Value) {
        self.state.updates.lock().unwrap().push_back(update);
    }

    /// Names of every method called so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.state.methods.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.sent.lock().unwrap().clone()
    }

    /// Ids of deleted messages
    pub fn deleted(&self) -> Vec<i64> {
        self.state.deleted.lock().unwrap().clone()
    }

    /// URL of the last `setWebhook` call
    pub fn webhook_url(&self) -> Option<String> {
        self.state.webhook_url.lock().unwrap().clone()
    }

    /// Poll until `method` has been called or `timeout` passes
    pub async fn wait_for_method(&self, method: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        while tokio::time::Instant::now() < deadline {
            if self.state.methods.lock().unwrap().iter().any(|m| m == method) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        false
    }

    /// Poll until `count` messages have been sent or `timeout` passes
    pub async fn wait_for_sent(&self, count: usize, timeout: Duration) -> Vec<SentMessage> {
        let deadline = tokio::time::Instant::now() + timeout;

        while tokio::time::Instant::now() < deadline {
            if self.state.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        self.sent()
    }
}

impl Drop for MockTelegram {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn ok(result: Value) -> Response {
    Json(json!({ "ok": true, "result": result })).into_response()
}

fn api_error(status: StatusCode, description: &str) -> Response {
    (
        status,
        Json(json!({ "ok": false, "error_code": status.as_u16(), "description": description })),
    )
        .into_response()
}

async fn handle_method(
    State(state): State<Arc<MockTelegramState>>,
    Path((bot, method)): Path<(String, String)>,
    Json(params): Json<Value>,
) -> Response {
    if bot != format!("bot{TOKEN}") {
        return api_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    state.methods.lock().unwrap().push(method.clone());

    match method.as_str() {
        "getUpdates" => {
            let updates: Vec<Value> = state.updates.lock().unwrap().drain(..).collect();
            if updates.is_empty() {
                // Stand-in for the long poll so the client does not spin
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            ok(Value::Array(updates))
        }
        "sendMessage" => {
            let message_id = state.next_message_id.fetch_add(1, Ordering::SeqCst);
            let chat_id = params["chat_id"].as_i64().unwrap_or_default();
            let text = params["text"].as_str().unwrap_or_default().to_owned();

            state.sent.lock().unwrap().push(SentMessage {
                message_id,
                chat_id,
                text: text.clone(),
                reply_to: params["reply_parameters"]["message_id"].as_i64(),
            });

            ok(json!({ "message_id": message_id, "chat": { "id": chat_id }, "text": text }))
        }
        "deleteMessage" => {
            if let Some(id) = params["message_id"].as_i64() {
                state.deleted.lock().unwrap().push(id);
            }
            ok(json!(true))
        }
        "getFile" => {
            let file_id = params["file_id"].as_str().unwrap_or_default();
            ok(json!({ "file_id": file_id, "file_size": 21, "file_path": FILE_PATH }))
        }
        "setWebhook" => {
            *state.webhook_url.lock().unwrap() = params["url"].as_str().map(ToOwned::to_owned);
            ok(json!(true))
        }
        "setMyCommands" | "deleteWebhook" => ok(json!(true)),
        _ => api_error(StatusCode::NOT_FOUND, "Not Found: method not found"),
    }
}

async fn handle_file(State(state): State<Arc<MockTelegramState>>, Path((bot, path)): Path<(String, String)>) -> Response {
    if bot != format!("bot{TOKEN}") || path.trim_start_matches('/') != FILE_PATH {
        return StatusCode::NOT_FOUND.into_response();
    }

    match &state.file {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A private-chat voice message update
pub fn voice_update(update_id: i64, chat_id: i64, message_id: i64, file_size: u64) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": message_id,
            "chat": { "id": chat_id, "type": "private" },
            "voice": { "file_id": "voice-file", "file_unique_id": "u1", "duration": 3, "file_size": file_size }
        }
    })
}

/// A private-chat text message update
pub fn text_update(update_id: i64, chat_id: i64, message_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": message_id,
            "chat": { "id": chat_id, "type": "private" },
            "text": text
        }
    })
}
