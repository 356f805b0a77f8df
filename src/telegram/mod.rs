//! Telegram Bot API module.
//!
//! Provides the outbound message channel and the update polling used by
//! command handling. The client is an explicitly owned object wired in at
//! process start, not module-level state.

mod client;

pub use client::{Chat, IncomingMessage, TelegramClient, TelegramError, Update};
