//! Command types and definitions.

use std::fmt;

/// Available bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// First contact; same reply as help.
    Start,

    /// Show available commands.
    Help,

    /// Register this chat for outage notifications.
    Subscribe,

    /// Remove this chat from the notification list.
    Unsubscribe,

    /// Show subscription state and the last check.
    Status,

    /// Force an immediate check cycle.
    Check,
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Accepts the `/command@botname` form Telegram uses in group chats.
    /// Returns `None` if the message is not a known command.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if !text.starts_with('/') {
            return None;
        }

        // First token only; commands of this bot carry no arguments.
        let token = text[1..].split_whitespace().next()?;
        let name = token.split('@').next()?.to_lowercase();

        match name.as_str() {
            "start" => Some(Self::Start),
            "help" | "h" | "?" => Some(Self::Help),
            "subscribe" | "sub" => Some(Self::Subscribe),
            "unsubscribe" | "unsub" => Some(Self::Unsubscribe),
            "status" | "stat" | "s" => Some(Self::Status),
            "check" | "now" => Some(Self::Check),
            _ => None,
        }
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Status => "status",
            Self::Check => "check",
        };
        write!(f, "{name}")
    }
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Reply text for the originating chat.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
