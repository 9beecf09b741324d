//! Background job scheduler.
//!
//! Registers the recurring stats broadcast when a webhook is configured.

use std::sync::Arc;
use std::time::Duration;

use reachwatch_collector::Collector;
use reachwatch_core::{render_report, SettingsStore};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Posts the current report and snapshot to a webhook.
pub struct Broadcaster {
    collector: Arc<Collector>,
    settings: Arc<SettingsStore>,
    client: reqwest::Client,
    webhook_url: String,
}

impl Broadcaster {
    #[must_use]
    pub fn new(
        collector: Arc<Collector>,
        settings: Arc<SettingsStore>,
        client: reqwest::Client,
        webhook_url: String,
    ) -> Self {
        Self {
            collector,
            settings,
            client,
            webhook_url,
        }
    }

    /// Sends one broadcast.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` on network failure or a non-2xx response.
    pub async fn broadcast_once(&self) -> Result<(), reqwest::Error> {
        let snapshot = self.collector.get_snapshot().await;
        let profiles = self.settings.profiles().await;
        let text = render_report(&snapshot, &profiles, self.collector.ttl().as_secs());

        self.client
            .post(&self.webhook_url)
            .json(&serde_json::json!({
                "text": text,
                "snapshot": &*snapshot,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn run(&self) {
        tracing::info!(webhook = %self.webhook_url, "scheduler: broadcasting stats");
        match self.broadcast_once().await {
            Ok(()) => tracing::info!("scheduler: broadcast delivered"),
            Err(e) => tracing::error!(error = %e, "scheduler: broadcast failed"),
        }
    }
}

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    collector: Arc<Collector>,
    settings: Arc<SettingsStore>,
    client: reqwest::Client,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match settings.broadcast_webhook_url().await {
        Some(webhook_url) => {
            let interval = Duration::from_secs(settings.broadcast_interval_seconds().await);
            let broadcaster = Arc::new(Broadcaster::new(collector, settings, client, webhook_url));
            register_broadcast_jobs(&scheduler, broadcaster, interval).await?;
            tracing::info!(
                interval_secs = interval.as_secs(),
                "scheduler: stats broadcast scheduled"
            );
        }
        None => {
            tracing::info!("scheduler: broadcast_webhook_url not set; automatic broadcast disabled");
        }
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Registers an immediate first broadcast plus the repeating one.
async fn register_broadcast_jobs(
    scheduler: &JobScheduler,
    broadcaster: Arc<Broadcaster>,
    interval: Duration,
) -> Result<(), JobSchedulerError> {
    let first = Arc::clone(&broadcaster);
    let initial = Job::new_one_shot_async(Duration::ZERO, move |_uuid, _lock| {
        let broadcaster = Arc::clone(&first);
        Box::pin(async move { broadcaster.run().await })
    })?;

    let repeating = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let broadcaster = Arc::clone(&broadcaster);
        Box::pin(async move { broadcaster.run().await })
    })?;

    scheduler.add(initial).await?;
    scheduler.add(repeating).await?;
    Ok(())
}
