//! Upstream schedule fetching.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::retry::RetryPolicy;

/// Errors that can occur while fetching the outage schedule.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Source of the raw schedule payload.
///
/// The production implementation talks HTTP; tests substitute an in-memory
/// double so the check cycle can be driven without a network.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetches the raw upstream payload (HTML or JSON, body as text).
    async fn fetch_schedule(&self) -> anyhow::Result<String>;
}

/// HTTP client for the outage schedule endpoint.
///
/// The upstream is a scraped website, not a documented API: it expects a
/// form-encoded POST with a street identifier and a house number and answers
/// with either an HTML fragment or JSON.
pub struct ScheduleClient {
    http: reqwest::Client,
    url: String,
    street_id: u32,
    house: String,
    retry: RetryPolicy,
}

impl ScheduleClient {
    /// Builds a client with the request timeout applied at the HTTP layer.
    ///
    /// The timeout aborts the in-flight request; its firing surfaces as a
    /// retryable [`FetchError::Http`].
    pub fn new(
        url: String,
        street_id: u32,
        house: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            url,
            street_id,
            house,
            retry,
        })
    }

    async fn fetch_once(&self) -> Result<String, FetchError> {
        let response = self
            .http
            .post(&self.url)
            .form(&[
                ("streetId", self.street_id.to_string()),
                ("house", self.house.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched upstream schedule");
        Ok(body)
    }
}

#[async_trait]
impl ScheduleSource for ScheduleClient {
    async fn fetch_schedule(&self) -> anyhow::Result<String> {
        let body = self
            .retry
            .run(
                || self.fetch_once(),
                |err, attempt| {
                    warn!(attempt, "Upstream fetch failed, will retry: {err}");
                },
            )
            .await?;
        Ok(body)
    }
}

impl std::fmt::Debug for ScheduleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleClient")
            .field("url", &self.url)
            .field("street_id", &self.street_id)
            .field("house", &self.house)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
