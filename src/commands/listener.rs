//! Long-poll update listener.
//!
//! Polls `getUpdates` and routes command messages through the handler,
//! replying in the chat that issued the command. Transport errors back off
//! briefly and the loop continues; the listener only stops when its task is
//! aborted at shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::CommandHandler;
use crate::telegram::TelegramClient;

/// Long-poll timeout passed to `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before trying again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Runs the update loop until the task is aborted.
pub async fn run_listener(client: Arc<TelegramClient>, handler: CommandHandler) {
    let mut offset = 0i64;

    debug!("Command listener started");

    loop {
        let updates = match client.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(err) => {
                warn!("Polling updates failed: {}", err);
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };

            let chat_id = message.chat.id;
            if let Some(result) = handler.try_handle(&text, chat_id).await
                && let Err(err) = client.send_message(chat_id, &result.message).await
            {
                warn!(chat_id, "Failed to send command reply: {}", err);
            }
        }
    }
}
