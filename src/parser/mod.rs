//! Upstream response interpretation.
//!
//! Turns an unpredictable upstream payload (HTML schedule table, HTML
//! "no outages" banner, or JSON in several shapes) into a normalized event
//! list. Malformed input never fails the check cycle; it degrades to an
//! empty list with a log line.

mod event;
mod html;
mod json;

pub use event::{EMERGENCY_SHUTDOWN_MARKER, ShutdownEvent};

use tracing::debug;

/// Classifies and parses a raw upstream payload into outage events.
///
/// HTML bodies go through the DOM table walk (or the all-clear banner
/// short-circuit); anything else is treated as a JSON candidate.
#[must_use]
pub fn parse_events(body: &str) -> Vec<ShutdownEvent> {
    if html::looks_like_html(body) {
        if html::is_all_clear(body) {
            debug!("Upstream reports no registered outages");
            return Vec::new();
        }
        return html::parse_html(body);
    }

    json::parse_json(body)
}
