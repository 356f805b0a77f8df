//! Outage Notify Bot Library
//!
//! A Telegram bot that polls a utility-outage website on a schedule,
//! detects changes in the published schedule, and broadcasts them to
//! registered subscribers.
//!
//! This crate provides the core functionality for:
//! - Fetching the schedule page with bounded retries
//! - Interpreting the upstream payload (HTML table, all-clear banner, or
//!   JSON in several shapes) into normalized outage events
//! - Hash-based change detection over the rendered message
//! - Fanning notifications out to subscribers with independent outcomes

pub mod commands;
pub mod config;
pub mod fetch;
pub mod notify;
pub mod parser;
pub mod scheduler;
pub mod state;
pub mod telegram;
