//! Command handler implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::types::{BotCommand, CommandResult};
use crate::scheduler::{CycleOutcome, ShutdownMonitor};
use crate::state::StateStore;

/// Handles bot commands against the state store and the monitor.
pub struct CommandHandler {
    store: Arc<StateStore>,
    monitor: Arc<ShutdownMonitor>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(store: Arc<StateStore>, monitor: Arc<ShutdownMonitor>) -> Self {
        Self { store, monitor }
    }

    /// Tries to parse and execute a command from a message.
    ///
    /// Returns `None` if the message is not a command, so ordinary chat
    /// messages get no reply.
    pub async fn try_handle(&self, message_text: &str, chat_id: i64) -> Option<CommandResult> {
        let command = BotCommand::parse(message_text)?;

        debug!(chat_id, %command, "Handling command");
        let result = self.execute(command, chat_id).await;
        info!(chat_id, %command, success = result.success, "Command handled");

        Some(result)
    }

    async fn execute(&self, command: BotCommand, chat_id: i64) -> CommandResult {
        match command {
            BotCommand::Start | BotCommand::Help => Self::handle_help(),
            BotCommand::Subscribe => self.handle_subscribe(chat_id).await,
            BotCommand::Unsubscribe => self.handle_unsubscribe(chat_id).await,
            BotCommand::Status => self.handle_status(chat_id).await,
            BotCommand::Check => self.handle_check().await,
        }
    }

    async fn handle_subscribe(&self, chat_id: i64) -> CommandResult {
        match self.store.add_subscriber(chat_id).await {
            Ok(true) => CommandResult::success(
                "🔔 Subscribed. You will be notified when the outage schedule changes.",
            ),
            Ok(false) => CommandResult::success("Already subscribed."),
            Err(err) => {
                warn!(chat_id, "Failed to persist subscription: {}", err);
                CommandResult::error("Could not save your subscription, please try again.")
            }
        }
    }

    async fn handle_unsubscribe(&self, chat_id: i64) -> CommandResult {
        match self.store.remove_subscriber(chat_id).await {
            Ok(true) => CommandResult::success("🔕 Unsubscribed. No further notifications."),
            Ok(false) => CommandResult::success("You were not subscribed."),
            Err(err) => {
                warn!(chat_id, "Failed to persist unsubscription: {}", err);
                CommandResult::error("Could not remove your subscription, please try again.")
            }
        }
    }

    async fn handle_status(&self, chat_id: i64) -> CommandResult {
        let state = self.store.load().await;

        let subscribed = if state.subscribers.contains(&chat_id) {
            "yes"
        } else {
            "no"
        };
        let last_check = state.last_check_time.map_or_else(
            || "never".to_owned(),
            |t| t.format("%d.%m.%Y %H:%M UTC").to_string(),
        );

        CommandResult::success(format!(
            "Subscribed: {subscribed}\n\
             Subscribers: {}\n\
             Last broadcast: {last_check}\n\
             Events in last broadcast: {}",
            state.subscribers.len(),
            state.last_event_ids.len(),
        ))
    }

    async fn handle_check(&self) -> CommandResult {
        match self.monitor.run_cycle(true).await {
            Ok(CycleOutcome::Notified {
                events,
                sent,
                failed,
            }) => CommandResult::success(format!(
                "✓ Check complete: {events} event(s), delivered to {sent} chat(s), {failed} failed."
            )),
            // A forced cycle always notifies; Unchanged cannot happen here.
            Ok(CycleOutcome::Unchanged) => CommandResult::success("✓ Check complete, no change."),
            Err(err) => {
                warn!("Forced check failed: {err:#}");
                CommandResult::error(format!("Check failed: {err:#}"))
            }
        }
    }

    fn handle_help() -> CommandResult {
        CommandResult::success(
            "Outage notification bot commands:\n\
             /subscribe - get notified when the outage schedule changes\n\
             /unsubscribe - stop notifications\n\
             /status - subscription state and last check\n\
             /check - run a check right now\n\
             /help - this message",
        )
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler").finish_non_exhaustive()
    }
}
