//! Check-and-notify cycle orchestration.
//!
//! One cycle runs: fetch → parse → format + fingerprint → compare with the
//! stored hash → (skip if equal and not forced) → broadcast → persist. Both
//! triggers (cron tick and forced invocation) drive the same cycle, and
//! cycles are serialized by an internal mutex so an overlapping forced check
//! cannot race a scheduled one on the state snapshot.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::fetch::ScheduleSource;
use crate::notify::{Broadcaster, escape_html, fingerprint, format_message};
use crate::parser::{self, ShutdownEvent};
use crate::state::StateStore;

/// Product of one fetch-and-format pass: the parsed events, the rendered
/// message, and its fingerprint. Consumed by the broadcast step and
/// discarded; only the hash and event ids are persisted.
#[derive(Debug, Clone)]
pub struct ScheduleSnapshot {
    /// Normalized events in upstream row order.
    pub events: Vec<ShutdownEvent>,

    /// Rendered notification text.
    pub message: String,

    /// Fingerprint of `message`.
    pub hash: String,
}

impl ScheduleSnapshot {
    /// Parses and renders a raw upstream body.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        let events = parser::parse_events(body);
        let message = format_message(&events);
        let hash = fingerprint(&message);

        Self {
            events,
            message,
            hash,
        }
    }

    /// Whether the schedule carries any outage windows.
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}

/// Result of one check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The rendered schedule matched the last broadcast one; nothing sent.
    Unchanged,

    /// The schedule changed (or the cycle was forced) and was broadcast.
    Notified {
        /// Events in the fetched schedule.
        events: usize,
        /// Recipients that accepted the message.
        sent: usize,
        /// Recipients whose delivery failed.
        failed: usize,
    },
}

/// Orchestrates check cycles over the fetcher, parser, store, and
/// broadcaster.
pub struct ShutdownMonitor {
    source: Arc<dyn ScheduleSource>,
    store: Arc<StateStore>,
    broadcaster: Broadcaster,
    cycle_lock: Mutex<()>,
}

impl ShutdownMonitor {
    /// Creates a monitor over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn ScheduleSource>,
        store: Arc<StateStore>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            source,
            store,
            broadcaster,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Runs one check cycle.
    ///
    /// A forced cycle broadcasts even when the fingerprint matches the
    /// stored one. The new fingerprint and check time are persisted only
    /// after a broadcast; a failed persist is propagated, since losing it
    /// would duplicate the next notification.
    ///
    /// # Errors
    ///
    /// Returns an error when the upstream fetch exhausts its retries or the
    /// state snapshot cannot be written.
    pub async fn run_cycle(&self, force: bool) -> Result<CycleOutcome> {
        let _cycle = self.cycle_lock.lock().await;

        info!(force, "Starting check cycle");

        let body = self
            .source
            .fetch_schedule()
            .await
            .context("Upstream fetch failed")?;

        let snapshot = ScheduleSnapshot::from_body(&body);

        let last_hash = self.store.last_hash().await;
        if !force && last_hash.as_deref() == Some(snapshot.hash.as_str()) {
            debug!("Schedule unchanged since last broadcast, skipping");
            return Ok(CycleOutcome::Unchanged);
        }

        let subscribers = self.store.subscribers().await;
        let report = self
            .broadcaster
            .broadcast(&subscribers, &snapshot.message)
            .await;

        let event_ids = snapshot
            .events
            .iter()
            .map(|event| event.id.clone())
            .collect();
        self.store
            .record_check(&snapshot.hash, event_ids)
            .await
            .context("Failed to persist check state")?;

        info!(
            has_events = snapshot.has_events(),
            events = snapshot.events.len(),
            sent = report.sent,
            failed = report.failed,
            "Check cycle complete"
        );

        Ok(CycleOutcome::Notified {
            events: snapshot.events.len(),
            sent: report.sent,
            failed: report.failed,
        })
    }

    /// Runs one cycle for the scheduler, never propagating the failure.
    ///
    /// A failed cycle is reported to the default chat best-effort and
    /// logged; the next scheduled tick runs regardless.
    pub async fn check_and_report(&self, force: bool) {
        if let Err(err) = self.run_cycle(force).await {
            error!("Check cycle failed: {err:#}");

            let notice = format!("⚠️ Outage check failed: {}", escape_html(&format!("{err:#}")));
            if let Err(notify_err) = self.broadcaster.send_to_default(&notice).await {
                error!("Could not deliver failure notice: {notify_err:#}");
            }
        }
    }
}

impl std::fmt::Debug for ShutdownMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownMonitor")
            .field("broadcaster", &self.broadcaster)
            .finish_non_exhaustive()
    }
}
