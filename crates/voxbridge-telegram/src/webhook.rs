use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use voxbridge_config::HealthConfig;

use crate::{bot::Bot, types::Update};

/// Shared state for the webhook endpoint
#[derive(Clone)]
struct WebhookState {
    bot: Arc<Bot>,
    token: SecretString,
}

/// Options for [`run_webhook`]
pub struct WebhookOptions {
    pub listen_address: SocketAddr,
    /// Public base URL Telegram should call
    pub host: String,
    pub token: SecretString,
    pub health: HealthConfig,
}

/// Public URL of the webhook endpoint for a host and token
pub fn webhook_url(host: &str, token: &SecretString) -> String {
    format!("{}/webhook/{}", host.trim_end_matches('/'), token.expose_secret())
}

/// Router with the webhook endpoint and liveness routes
///
/// `GET /` always answers `ok`, as does the configured health path when enabled.
pub fn router(bot: Arc<Bot>, token: SecretString, health: &HealthConfig) -> Router {
    let state = WebhookState { bot, token };

    let mut app = Router::new()
        .route("/webhook/{token}", post(receive_update))
        .with_state(state)
        .route("/", get(health_handler));

    if health.enabled && health.path != "/" {
        app = app.route(&health.path, get(health_handler));
    }

    app.layer(TraceLayer::new_for_http())
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Accept an update from Telegram and handle it in the background
///
/// The token is checked before the body is decoded, so a wrong token is a 404
/// whatever the payload.
async fn receive_update(
    State(state): State<WebhookState>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    if !token_matches(&token, state.token.expose_secret()) {
        return StatusCode::NOT_FOUND;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!("rejecting malformed webhook update: {e}");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::debug!(update_id = update.update_id, "webhook update received");
    state.bot.spawn_update(update);

    StatusCode::OK
}

/// Compare tokens without short-circuiting on the first differing byte
fn token_matches(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());

    given.len() == expected.len() && given.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Register the webhook and serve it until the token is cancelled
///
/// The webhook is removed again on shutdown.
///
/// # Errors
///
/// Returns an error if registering the webhook, binding the listener or
/// serving fails
pub async fn run_webhook(bot: Arc<Bot>, options: WebhookOptions, shutdown: CancellationToken) -> anyhow::Result<()> {
    let url = webhook_url(&options.host, &options.token);

    bot.client()
        .set_webhook(&url)
        .await
        .map_err(|e| anyhow::anyhow!("failed to register webhook: {e}"))?;
    tracing::info!(host = %options.host, "webhook registered");

    let app = router(Arc::clone(&bot), options.token, &options.health);

    let listener = tokio::net::TcpListener::bind(options.listen_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

    match bot.client().delete_webhook(false).await {
        Ok(_) => tracing::info!("webhook removed"),
        Err(e) => tracing::warn!("failed to remove webhook: {e}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_comparison() {
        assert!(token_matches("123:abc", "123:abc"));
        assert!(!token_matches("123:abd", "123:abc"));
        assert!(!token_matches("123:ab", "123:abc"));
        assert!(!token_matches("", "123:abc"));
    }

    #[test]
    fn webhook_url_trims_trailing_slash() {
        let token = SecretString::from("123:abc");

        assert_eq!(webhook_url("https://bot.example.com/", &token), "https://bot.example.com/webhook/123:abc");
        assert_eq!(webhook_url("https://bot.example.com", &token), "https://bot.example.com/webhook/123:abc");
    }
}
