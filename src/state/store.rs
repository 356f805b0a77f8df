//! Durable process state.
//!
//! One JSON snapshot holds everything that must survive restarts: the last
//! broadcast fingerprint, the last check time, the last event ids, and the
//! subscriber set. Every read-modify-write runs under a single async mutex
//! and saves go through a temp-file rename, so concurrent callers cannot
//! interleave partial updates.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

/// Errors that can occur while persisting state.
///
/// Load errors are not represented here: a missing or unreadable snapshot is
/// a valid first-run state, while a failed save must reach the caller (a
/// silently lost fingerprint would duplicate the next notification).
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write state file: {0}")]
    Io(#[from] std::io::Error),
}

/// Snapshot of the process state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StateData {
    /// Fingerprint of the last broadcast message.
    #[serde(default)]
    pub last_message_hash: Option<String>,

    /// When the last broadcast cycle completed.
    #[serde(default)]
    pub last_check_time: Option<DateTime<Utc>>,

    /// Event ids from the last broadcast fetch.
    #[serde(default)]
    pub last_event_ids: Vec<String>,

    /// Registered chat ids, in subscription order, no duplicates.
    #[serde(default)]
    pub subscribers: Vec<i64>,
}

impl StateData {
    /// Registers a subscriber. Returns false when already present.
    pub fn add_subscriber(&mut self, chat_id: i64) -> bool {
        if self.subscribers.contains(&chat_id) {
            return false;
        }
        self.subscribers.push(chat_id);
        true
    }

    /// Removes a subscriber. Returns false when it was not registered.
    pub fn remove_subscriber(&mut self, chat_id: i64) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|&id| id != chat_id);
        self.subscribers.len() != before
    }

    fn read_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            // Missing file is the normal first-run state.
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&text) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    "State file is corrupt, starting from defaults: {}", err
                );
                Self::default()
            }
        }
    }

    fn write_to(&self, path: &Path) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(self)?;

        // Write-then-rename so a crash mid-write cannot truncate the
        // previous snapshot.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Mutex-guarded handle to the state snapshot on disk.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl StateStore {
    /// Creates a store backed by the snapshot at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Loads the current snapshot, returning defaults when none exists or
    /// the file cannot be parsed. Never fails observably.
    pub async fn load(&self) -> StateData {
        let _guard = self.guard.lock().await;
        StateData::read_from(&self.path)
    }

    /// Loads, applies `apply`, and saves the snapshot atomically with
    /// respect to other store operations.
    ///
    /// # Errors
    ///
    /// Returns an error when the modified snapshot cannot be written.
    pub async fn update<R>(&self, apply: impl FnOnce(&mut StateData) -> R) -> Result<R, StateError> {
        let _guard = self.guard.lock().await;

        let mut state = StateData::read_from(&self.path);
        let result = apply(&mut state);
        state.write_to(&self.path)?;
        Ok(result)
    }

    /// Fingerprint of the last broadcast message, if any.
    pub async fn last_hash(&self) -> Option<String> {
        self.load().await.last_message_hash
    }

    /// Records a completed broadcast: new fingerprint, event ids, and the
    /// current time.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be written.
    pub async fn record_check(
        &self,
        hash: &str,
        event_ids: Vec<String>,
    ) -> Result<(), StateError> {
        self.update(|state| {
            state.last_message_hash = Some(hash.to_owned());
            state.last_check_time = Some(Utc::now());
            state.last_event_ids = event_ids;
        })
        .await
    }

    /// Registers a subscriber. Returns whether it was newly added.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be written.
    pub async fn add_subscriber(&self, chat_id: i64) -> Result<bool, StateError> {
        self.update(|state| state.add_subscriber(chat_id)).await
    }

    /// Removes a subscriber. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be written.
    pub async fn remove_subscriber(&self, chat_id: i64) -> Result<bool, StateError> {
        self.update(|state| state.remove_subscriber(chat_id)).await
    }

    /// Current subscriber list in registration order.
    pub async fn subscribers(&self) -> Vec<i64> {
        self.load().await.subscribers
    }
}
