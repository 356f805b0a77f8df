//! Configuration module for the outage bot.
//!
//! All runtime configuration comes from environment variables, validated
//! once at startup.

mod settings;

pub use settings::{ConfigError, Settings};
