#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::{sync::Arc, time::Duration};

use args::Args;
use clap::Parser;
use stt::FailoverController;
use tokio_util::sync::CancellationToken;
use voxbridge_config::{Config, TransportMode};
use voxbridge_telegram::{Bot, TelegramClient, WebhookOptions};

/// How long in-flight transcriptions may run after a shutdown signal
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    // Initialize logging
    voxbridge_telemetry::init(&config.telemetry)?;

    tracing::info!(
        config_path = ?args.config.as_ref().map(|p| p.display().to_string()),
        mode = ?config.telegram.mode,
        "starting voxbridge"
    );

    let token = config
        .telegram
        .bot_token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("telegram bot token missing, set BOT_TOKEN or telegram.bot_token"))?;

    // No provider credential is fatal here
    let controller = Arc::new(FailoverController::from_config(&config.stt)?);

    let poll_timeout = voxbridge_config::parse_duration(&config.telegram.poll_timeout)?;
    let client = TelegramClient::new(&config.telegram.api_url, &token, poll_timeout)?;
    let bot = Arc::new(Bot::new(client, controller));

    if let Err(e) = bot.register_commands().await {
        tracing::warn!("failed to register bot commands: {e}");
    }

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    match config.telegram.mode {
        TransportMode::Polling => {
            voxbridge_telegram::run_polling(Arc::clone(&bot), poll_timeout, shutdown).await?;
        }
        TransportMode::Webhook => {
            let host = config
                .telegram
                .webhook_host
                .clone()
                .ok_or_else(|| anyhow::anyhow!("telegram.webhook_host is required in webhook mode"))?;

            let options = WebhookOptions {
                listen_address: config.server.listen_address(),
                host,
                token,
                health: config.server.health.clone(),
            };

            voxbridge_telegram::run_webhook(Arc::clone(&bot), options, shutdown).await?;
        }
    }

    bot.drain(DRAIN_TIMEOUT).await;

    tracing::info!("voxbridge stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
