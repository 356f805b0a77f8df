//! Notification fan-out.
//!
//! Delivers one rendered message to every recipient independently. One
//! recipient's failure never prevents delivery to the others; outcomes are
//! collected into a report instead of short-circuiting.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::fetch::RetryPolicy;

/// Send-text-to-recipient seam, implemented by the Telegram client.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends rich-text `text` to the chat identified by `chat_id`.
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
}

/// Delivery counts for one broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients that accepted the message.
    pub sent: usize,

    /// Recipients whose delivery failed after all retry attempts.
    pub failed: usize,
}

/// Fans a message out to the default chat plus all subscribers.
pub struct Broadcaster {
    messenger: Arc<dyn Messenger>,
    default_chat_id: i64,
    retry: RetryPolicy,
}

impl Broadcaster {
    /// Creates a broadcaster delivering through `messenger`.
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, default_chat_id: i64, retry: RetryPolicy) -> Self {
        Self {
            messenger,
            default_chat_id,
            retry,
        }
    }

    /// Assembles the recipient list: the configured default chat first, then
    /// subscribers in registration order, deduplicated.
    #[must_use]
    pub fn recipients(&self, subscribers: &[i64]) -> Vec<i64> {
        let mut recipients = vec![self.default_chat_id];
        for &chat_id in subscribers {
            if !recipients.contains(&chat_id) {
                recipients.push(chat_id);
            }
        }
        recipients
    }

    /// Single best-effort send to the configured default chat, used for
    /// operational notices such as cycle failures. No retry.
    pub async fn send_to_default(&self, text: &str) -> anyhow::Result<()> {
        self.messenger.send_text(self.default_chat_id, text).await
    }

    /// Delivers `text` to every recipient concurrently.
    ///
    /// Each send carries its own bounded retry; the broadcast itself never
    /// retries and never fails just because a subset of recipients failed.
    pub async fn broadcast(&self, subscribers: &[i64], text: &str) -> BroadcastReport {
        let recipients = self.recipients(subscribers);

        if recipients.is_empty() {
            warn!("No recipients to notify");
            return BroadcastReport { sent: 0, failed: 0 };
        }

        let mut tasks = JoinSet::new();
        for chat_id in recipients {
            let messenger = Arc::clone(&self.messenger);
            let text = text.to_owned();
            let retry = self.retry;

            tasks.spawn(async move {
                let outcome = retry
                    .run(
                        || messenger.send_text(chat_id, &text),
                        |err, attempt| {
                            warn!(
                                chat_id,
                                attempt, "Send failed, will retry: {err:#}"
                            );
                        },
                    )
                    .await;

                if let Err(err) = &outcome {
                    error!(chat_id, "Delivery failed after all attempts: {err:#}");
                }
                outcome.is_ok()
            });
        }

        let mut report = BroadcastReport { sent: 0, failed: 0 };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => report.sent += 1,
                Ok(false) => report.failed += 1,
                Err(err) => {
                    error!("Delivery task panicked: {err}");
                    report.failed += 1;
                }
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            "Broadcast complete"
        );
        report
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("default_chat_id", &self.default_chat_id)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
