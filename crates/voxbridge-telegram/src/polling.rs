use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::bot::Bot;

/// Pause after a failed `getUpdates` call
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Receive updates with `getUpdates` until the token is cancelled
///
/// Any webhook left from a previous deployment is removed first, along with
/// updates that queued up while the bot was offline.
///
/// # Errors
///
/// Returns an error if the webhook cannot be removed
pub async fn run_polling(bot: Arc<Bot>, poll_timeout: Duration, shutdown: CancellationToken) -> anyhow::Result<()> {
    bot.client()
        .delete_webhook(true)
        .await
        .map_err(|e| anyhow::anyhow!("failed to clear webhook before polling: {e}"))?;

    tracing::info!(timeout_secs = poll_timeout.as_secs(), "long polling started");

    let mut offset: Option<i64> = None;

    loop {
        let result = tokio::select! {
            () = shutdown.cancelled() => break,
            result = bot.client().get_updates(offset, poll_timeout) => result,
        };

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    bot.spawn_update(update);
                }
            }
            Err(e) => {
                tracing::warn!("getUpdates failed: {e}");

                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(ERROR_BACKOFF) => {}
                }
            }
        }
    }

    tracing::info!("long polling stopped");
    Ok(())
}
