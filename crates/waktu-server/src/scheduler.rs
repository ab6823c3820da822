//! Background job scheduler.
//!
//! Registers the daily pre-warm run that refreshes every zone so the first
//! request of the day is served from the store.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tokio_util::sync::CancellationToken;
use waktu_sync::{BatchOptions, PrayerTimeService};

/// Builds and starts the scheduler with the pre-warm job on `cron`.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    service: Arc<PrayerTimeService>,
    cron: &str,
    shutdown: CancellationToken,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_prewarm_job(&scheduler, cron, service, shutdown).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_prewarm_job(
    scheduler: &JobScheduler,
    cron: &str,
    service: Arc<PrayerTimeService>,
    shutdown: CancellationToken,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let service = Arc::clone(&service);
        let cancel = shutdown.child_token();

        Box::pin(async move {
            tracing::info!("scheduler: starting daily pre-warm run");
            run_prewarm(&service, &cancel).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered daily pre-warm job");
    Ok(())
}

/// One pre-warm pass at the configured maximum concurrency.
pub(crate) async fn run_prewarm(service: &PrayerTimeService, cancel: &CancellationToken) {
    let options = BatchOptions {
        concurrency: service.config().max_concurrency,
        ..BatchOptions::default()
    };

    match service.scrape_all(&options, cancel).await {
        Ok(summary) => tracing::info!(
            success_count = summary.success_count,
            failure_count = summary.failure_count,
            retried = summary.retried,
            duration_ms = summary.duration_ms,
            "scheduler: pre-warm run complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: pre-warm run failed"),
    }
}
