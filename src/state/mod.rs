//! Durable state snapshot module.
//!
//! Persists the last broadcast fingerprint, check time, event ids, and the
//! subscriber set as a single JSON snapshot.

mod store;

pub use store::{StateData, StateError, StateStore};
