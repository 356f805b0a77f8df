//! JSON schedule extraction.
//!
//! Observed upstream JSON shapes: a bare array of events, an object with a
//! `data` array, and an object carrying only a success flag (empty-but-valid
//! schedule). Everything else degrades to an empty list.

use serde_json::Value;
use tracing::{debug, warn};

use super::event::ShutdownEvent;

/// Extracts outage events from a JSON payload.
///
/// Malformed input is never an error: a parse failure or an unexpected shape
/// is logged and yields an empty list so the check cycle keeps running.
#[must_use]
pub fn parse_json(text: &str) -> Vec<ShutdownEvent> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            warn!("Upstream payload is neither HTML nor valid JSON: {}", err);
            return Vec::new();
        }
    };

    match value {
        Value::Array(items) => normalize_items(&items),
        Value::Object(ref obj) => {
            if let Some(Value::Array(items)) = obj.get("data") {
                return normalize_items(items);
            }
            if obj.contains_key("success") {
                debug!("Upstream JSON carries a success flag and no data");
                return Vec::new();
            }
            warn!("Unexpected upstream JSON object shape, treating as empty");
            Vec::new()
        }
        _ => {
            warn!("Unexpected upstream JSON value, treating as empty");
            Vec::new()
        }
    }
}

fn normalize_items(items: &[Value]) -> Vec<ShutdownEvent> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| ShutdownEvent::from_json_value(item, i + 1))
        .collect()
}
