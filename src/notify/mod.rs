//! Notification rendering, change detection, and fan-out.
//!
//! Formats the normalized event list into the message subscribers receive,
//! fingerprints it for the duplicate-broadcast gate, and delivers it to all
//! recipients with independent outcomes.

mod digest;
mod dispatcher;
mod message;

pub use digest::fingerprint;
pub use dispatcher::{BroadcastReport, Broadcaster, Messenger};
pub use message::{ALL_CLEAR_MESSAGE, escape_html, format_message};
