//! Upstream fetch and retry plumbing.
//!
//! The schedule endpoint is fetched over HTTP with a bounded timeout, and
//! every fallible network operation in the process goes through the same
//! constant-backoff retry executor.

mod client;
mod retry;

pub use client::{FetchError, ScheduleClient, ScheduleSource};
pub use retry::{RetryPolicy, retry};
