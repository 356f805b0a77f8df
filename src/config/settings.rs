//! Application settings.

use std::path::PathBuf;

/// Default upstream schedule endpoint.
const DEFAULT_UPSTREAM_URL: &str = "https://svitlo.oe.if.ua/GAVTurnOff/GavGroupByStreet";

/// Default street identifier sent with the upstream form.
const DEFAULT_STREET_ID: u32 = 564;

/// Default house identifier sent with the upstream form.
const DEFAULT_HOUSE: &str = "26";

/// Default schedule: every 30 minutes (seconds-resolution cron).
const DEFAULT_CHECK_CRON: &str = "0 */30 * * * *";

const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 5000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_STATE_PATH: &str = "state.json";

/// Runtime configuration, sourced from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Telegram bot token.
    pub bot_token: String,

    /// Chat that always receives notifications and failure notices.
    pub default_chat_id: i64,

    /// Upstream schedule endpoint.
    pub upstream_url: String,

    /// Street identifier for the upstream form body.
    pub street_id: u32,

    /// House identifier for the upstream form body.
    pub house: String,

    /// Cron expression driving scheduled check cycles.
    pub check_cron: String,

    /// Attempts per fallible network operation.
    pub retry_attempts: u32,

    /// Fixed delay between retry attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Upstream request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Path of the durable state snapshot.
    pub state_path: PathBuf,
}

impl Settings {
    /// Creates configuration from environment variables.
    ///
    /// Expects `TG_BOT_TOKEN` and `TG_DEFAULT_CHAT_ID` to be set; everything
    /// else has a default. Invalid values fail fast so the process never
    /// starts half-configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value is
    /// malformed or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Self {
            bot_token: required("TG_BOT_TOKEN")?,
            default_chat_id: parse_var("TG_DEFAULT_CHAT_ID")?
                .ok_or(ConfigError::MissingEnvVar("TG_DEFAULT_CHAT_ID"))?,
            upstream_url: std::env::var("SHUTDOWN_URL")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_owned()),
            street_id: parse_var("STREET_ID")?.unwrap_or(DEFAULT_STREET_ID),
            house: std::env::var("HOUSE").unwrap_or_else(|_| DEFAULT_HOUSE.to_owned()),
            check_cron: std::env::var("CHECK_CRON")
                .unwrap_or_else(|_| DEFAULT_CHECK_CRON.to_owned()),
            retry_attempts: parse_var("RETRY_ATTEMPTS")?.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            retry_delay_ms: parse_var("RETRY_DELAY_MS")?.unwrap_or(DEFAULT_RETRY_DELAY_MS),
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS")?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
            state_path: std::env::var("STATE_PATH")
                .map_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.is_empty() {
            return Err(ConfigError::MissingEnvVar("TG_BOT_TOKEN"));
        }
        if self.street_id == 0 {
            return Err(ConfigError::OutOfRange {
                var: "STREET_ID",
                min: 1,
            });
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                var: "RETRY_ATTEMPTS",
                min: 1,
            });
        }
        if self.retry_delay_ms < 100 {
            return Err(ConfigError::OutOfRange {
                var: "RETRY_DELAY_MS",
                min: 100,
            });
        }
        if self.request_timeout_ms < 1000 {
            return Err(ConfigError::OutOfRange {
                var: "REQUEST_TIMEOUT_MS",
                min: 1000,
            });
        }
        Ok(())
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .map_err(|_| ConfigError::MissingEnvVar(var))
        .and_then(|value| {
            if value.is_empty() {
                Err(ConfigError::MissingEnvVar(var))
            } else {
                Ok(value)
            }
        })
}

/// Reads and parses an optional variable; present-but-malformed is an error,
/// absent is `None`.
fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(var)),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Environment variable {0} has an invalid value")]
    InvalidValue(&'static str),

    #[error("Environment variable {var} must be at least {min}")]
    OutOfRange { var: &'static str, min: u64 },
}
