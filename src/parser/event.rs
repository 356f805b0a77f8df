//! Normalized outage event model.

use serde_json::Value;

/// Marker the upstream uses for emergency (hourly) shutdowns.
pub const EMERGENCY_SHUTDOWN_MARKER: &str = "ГАВ";

/// Placeholder for a missing work type.
pub const UNKNOWN_WORK_TYPE: &str = "Unknown";

/// Placeholder for a missing queue identifier.
pub const EMPTY_QUEUE: &str = "-";

/// One scheduled or active outage window reported by the utility.
///
/// Events are rebuilt from scratch on every fetch; the `id` is only stable
/// within a single upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownEvent {
    /// Row identifier within this fetch.
    pub id: String,

    /// Window start, as the upstream sent it (not guaranteed ISO-8601).
    pub date_start: String,

    /// Window end, as the upstream sent it.
    pub date_end: String,

    /// Work category (repair, maintenance, ...).
    pub work_type: String,

    /// Planned vs emergency indicator.
    pub shutdown_type: String,

    /// GPV (stabilization) queue identifier.
    pub queue_gpv: String,

    /// GAV (emergency) queue identifier.
    pub queue_gav: String,

    /// Free-text comment, when the upstream provides one.
    pub comment: Option<String>,

    /// Affected address, when the upstream provides one.
    pub address: Option<String>,
}

impl ShutdownEvent {
    /// Derived status label for display.
    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.shutdown_type == EMERGENCY_SHUTDOWN_MARKER {
            "Emergency"
        } else {
            "Planned"
        }
    }

    /// Normalizes one raw JSON element into an event.
    ///
    /// The upstream has been observed sending the same field under several
    /// names, so each target field is read from a list of known aliases.
    /// `position` is the 1-based index used when no id field is present.
    /// Returns `None` for non-object elements, which are dropped by the
    /// caller.
    #[must_use]
    pub(crate) fn from_json_value(value: &Value, position: usize) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        let id = string_field(value, &["id", "eventId"])
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| position.to_string());

        Some(Self {
            id,
            date_start: string_field(value, &["dateStart", "date_start", "startDate"])
                .unwrap_or_default(),
            date_end: string_field(value, &["dateEnd", "date_end", "endDate"])
                .unwrap_or_default(),
            work_type: string_field(value, &["type", "workType", "work_type"])
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_WORK_TYPE.to_owned()),
            shutdown_type: string_field(value, &["shutdownType", "shutdown_type"])
                .unwrap_or_default(),
            queue_gpv: string_field(value, &["queueGpv", "queue_gpv", "gpv"])
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| EMPTY_QUEUE.to_owned()),
            queue_gav: string_field(value, &["queueGav", "queue_gav", "gav"])
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| EMPTY_QUEUE.to_owned()),
            comment: string_field(value, &["comment", "note"]).filter(|s| !s.is_empty()),
            address: string_field(value, &["address", "addr"]).filter(|s| !s.is_empty()),
        })
    }
}

/// Reads the first present alias as a string, coercing scalars.
fn string_field(value: &Value, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        match value.get(alias) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => return Some(s.trim().to_owned()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            Some(Value::Bool(b)) => return Some(b.to_string()),
            // Arrays/objects in a scalar position are malformed; skip the
            // alias rather than stringify a structure.
            Some(_) => {}
        }
    }
    None
}
