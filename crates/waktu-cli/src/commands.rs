//! Command handlers. Each prints its result as pretty JSON on stdout.

use serde::Serialize;
use waktu_sync::{BatchOptions, BatchSummary, CancellationToken, PrayerTimeService};

use crate::{BatchArgs, Commands};

impl BatchArgs {
    pub(crate) fn options(self) -> BatchOptions {
        BatchOptions {
            parallel: !self.sequential,
            concurrency: self.concurrency,
            retry_failed: !self.no_retry_failed,
            ..BatchOptions::default()
        }
    }
}

pub(crate) async fn run(service: &PrayerTimeService, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Today { zone } => print_json(&service.get_or_fetch(zone.as_deref()).await?),
        Commands::Refresh { zone } => print_json(&service.force_refresh(&zone).await?),
        Commands::History { zone, limit } => print_json(&service.history(&zone, limit).await?),
        Commands::Zones => print_json(&service.zones_grouped().await?),
        Commands::ZonesRefresh => print_json(&service.refresh_catalog().await?),
        Commands::ScrapeAll(batch) => {
            let cancel = cancel_on_ctrl_c();
            let summary = service.scrape_all(&batch.options(), &cancel).await?;
            report(&summary)
        }
        Commands::ScrapeState { state, batch } => {
            let cancel = cancel_on_ctrl_c();
            let summary = service
                .scrape_state(&state, &batch.options(), &cancel)
                .await?;
            report(&summary)
        }
        Commands::Migrate => anyhow::bail!("migrate is handled before the service is built"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(summary: &BatchSummary) -> anyhow::Result<()> {
    if summary.failure_count > 0 {
        tracing::warn!(
            failure_count = summary.failure_count,
            total_zones = summary.total_zones,
            "some zones failed"
        );
    }
    print_json(summary)
}

/// Token cancelled on the first Ctrl-C so a batch stops dispatching.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing in-flight zones");
            trigger.cancel();
        }
    });
    cancel
}
