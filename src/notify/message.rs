//! Notification message rendering.
//!
//! The formatter is a pure function: identical event lists must produce
//! byte-identical output, because the change detector hashes the rendered
//! text. Date rendering therefore uses a fixed pattern set and never
//! consults the environment locale or timezone.

use chrono::NaiveDateTime;

use crate::parser::ShutdownEvent;

/// Fixed all-clear sentence, hashed like any other message.
pub const ALL_CLEAR_MESSAGE: &str = "✅ Power is available. No outages are currently scheduled.";

/// Display pattern for timestamps that parse with a known pattern.
const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Patterns the upstream has been observed using for timestamps.
const PARSE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Renders an event list into a single Telegram HTML message.
///
/// Events are rendered in input order, double-newline separated. Optional
/// address and comment lines are omitted when absent.
#[must_use]
pub fn format_message(events: &[ShutdownEvent]) -> String {
    if events.is_empty() {
        return ALL_CLEAR_MESSAGE.to_owned();
    }

    let noun = if events.len() == 1 { "outage" } else { "outages" };
    let mut blocks = vec![format!(
        "<b>⚡ Scheduled power {noun}: {}</b>",
        events.len()
    )];

    for (i, event) in events.iter().enumerate() {
        blocks.push(render_event(i + 1, event));
    }

    blocks.join("\n\n")
}

fn render_event(index: usize, event: &ShutdownEvent) -> String {
    let mut lines = vec![
        format!("<b>{index}. {}</b>", escape_html(&event.work_type)),
        format!("Status: {}", event.status()),
        format!(
            "🕒 {} → {}",
            format_timestamp(&event.date_start),
            format_timestamp(&event.date_end)
        ),
        format!(
            "Queues: GPV {} / GAV {}",
            escape_html(&event.queue_gpv),
            escape_html(&event.queue_gav)
        ),
    ];

    if let Some(address) = &event.address {
        lines.push(format!("📍 {}", escape_html(address)));
    }
    if let Some(comment) = &event.comment {
        lines.push(format!("💬 {}", escape_html(comment)));
    }

    lines.join("\n")
}

/// Re-renders an upstream timestamp into the fixed display pattern.
///
/// Falls back to the raw upstream string (escaped) when no known pattern
/// matches, so free-form values still reach the reader.
fn format_timestamp(raw: &str) -> String {
    for pattern in PARSE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format(DISPLAY_FORMAT).to_string();
        }
    }
    escape_html(raw)
}

/// Escapes Telegram HTML entities in text not produced by the formatter.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
