//! Outage Notify Bot - Main Entry Point
//!
//! Polls a utility-outage website on a cron schedule and broadcasts
//! schedule changes to registered Telegram chats.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use outage_notify_bot::commands::{self, CommandHandler};
use outage_notify_bot::config::Settings;
use outage_notify_bot::fetch::{RetryPolicy, ScheduleClient, ScheduleSource};
use outage_notify_bot::notify::{Broadcaster, Messenger};
use outage_notify_bot::scheduler::{self, ShutdownMonitor};
use outage_notify_bot::state::StateStore;
use outage_notify_bot::telegram::TelegramClient;

/// Telegram bot for utility outage schedule notifications.
#[derive(Parser, Debug)]
#[command(name = "outage_bot")]
#[command(about = "Watch a utility outage schedule and notify Telegram subscribers")]
#[command(version)]
struct Args {
    /// Run one forced check cycle immediately at startup.
    #[arg(long)]
    check_now: bool,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let settings =
        Settings::from_env().context("Failed to load configuration from environment")?;

    info!(
        url = %settings.upstream_url,
        street_id = settings.street_id,
        house = %settings.house,
        cron = %settings.check_cron,
        state_path = %settings.state_path.display(),
        "Configuration loaded"
    );

    let retry = RetryPolicy::new(
        settings.retry_attempts,
        Duration::from_millis(settings.retry_delay_ms),
    );

    let telegram = Arc::new(
        TelegramClient::new(&settings.bot_token).context("Failed to create Telegram client")?,
    );
    let store = Arc::new(StateStore::new(settings.state_path.clone()));

    let source: Arc<dyn ScheduleSource> = Arc::new(
        ScheduleClient::new(
            settings.upstream_url.clone(),
            settings.street_id,
            settings.house.clone(),
            Duration::from_millis(settings.request_timeout_ms),
            retry,
        )
        .context("Failed to create upstream client")?,
    );

    let broadcaster = Broadcaster::new(
        Arc::clone(&telegram) as Arc<dyn Messenger>,
        settings.default_chat_id,
        retry,
    );

    let monitor = Arc::new(ShutdownMonitor::new(source, Arc::clone(&store), broadcaster));

    // Command listener (subscribe/unsubscribe/status/check)
    let handler = CommandHandler::new(Arc::clone(&store), Arc::clone(&monitor));
    let listener_handle = tokio::spawn(commands::run_listener(Arc::clone(&telegram), handler));

    // Scheduled check cycles
    let mut job_scheduler = scheduler::start_schedule(Arc::clone(&monitor), &settings.check_cron)
        .await
        .context("Failed to start scheduled checks")?;

    if args.check_now {
        info!("Running forced startup check");
        monitor.check_and_report(true).await;
    }

    info!("Bot is running. Use Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    // Cleanup
    info!("Shutting down...");
    if let Err(e) = job_scheduler.shutdown().await {
        warn!("Job scheduler shutdown failed: {}", e);
    }
    listener_handle.abort();

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
