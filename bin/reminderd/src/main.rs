use habitual_core::Result;
use habitual_habits::HabitReminderProducer;
use habitual_notify::{ConsolePlatform, PlatformSink};
use habitual_reminderd::{ReminderdConfig, StartupError, load, rollover};
use habitual_scheduler::{ReminderScheduler, SystemClock};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Reminder daemon failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ReminderdConfig::from_env().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!("Loaded configuration");

    let ledger = Arc::new(load::load_ledger(
        &config.habits_file,
        config.vacations_file.as_deref(),
    )?);

    let platform = ConsolePlatform::new(config.notifications.permission);
    let sink = PlatformSink::new(platform).with_auto_dismiss(config.notifications.auto_dismiss());
    let clock = Arc::new(SystemClock);
    let scheduler =
        ReminderScheduler::new(Arc::new(sink), clock.clone()).with_grouping(config.grouping);

    let permission = scheduler.request_permission().await;
    tracing::info!(%permission, "Notification permission");

    let producer = HabitReminderProducer::new(scheduler.clone(), ledger, clock.clone());
    producer.resync().map_err(|e| StartupError::Ledger {
        details: e.to_string(),
    })?;

    let rollover_task = tokio::spawn(rollover::resync_daily(producer, clock));

    tracing::info!(
        reminders = scheduler.stats().total_reminders,
        "Reminder daemon running"
    );
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("Shutting down");
    rollover_task.abort();
    scheduler.clear();
    Ok(())
}
