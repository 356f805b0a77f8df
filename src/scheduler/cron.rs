//! Cron wiring for scheduled check cycles.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use super::ShutdownMonitor;

/// Starts the cron scheduler with one check-cycle job.
///
/// The job never fails the scheduler: cycle errors are absorbed by
/// [`ShutdownMonitor::check_and_report`], so one bad cycle cannot stop
/// future ticks. The returned scheduler handle is shut down by the caller
/// on process exit.
///
/// # Errors
///
/// Returns an error when the scheduler cannot be created or the cron
/// expression is invalid.
pub async fn start_schedule(
    monitor: Arc<ShutdownMonitor>,
    cron_expression: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .context("Failed to create job scheduler")?;

    let job = Job::new_async(cron_expression, move |_uuid, _lock| {
        let monitor = Arc::clone(&monitor);
        Box::pin(async move {
            monitor.check_and_report(false).await;
        })
    })
    .with_context(|| format!("Invalid cron expression: {cron_expression}"))?;

    scheduler
        .add(job)
        .await
        .context("Failed to register check-cycle job")?;
    scheduler
        .start()
        .await
        .context("Failed to start job scheduler")?;

    info!(cron = cron_expression, "Scheduled check cycles started");
    Ok(scheduler)
}
