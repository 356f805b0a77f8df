//! Command handling module.
//!
//! Processes subscription and status commands sent to the bot via Telegram
//! messages, polled over `getUpdates`.

mod handler;
mod listener;
mod types;

pub use handler::CommandHandler;
pub use listener::run_listener;
pub use types::{BotCommand, CommandResult};
