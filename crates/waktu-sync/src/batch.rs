//! Bounded fan-out of per-zone refreshes with an optional retry pass.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use waktu_core::PrayerTimeRecord;

use crate::error::SyncError;

/// Failure message for zones never dispatched because the batch was cancelled.
pub const CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// `false` forces one zone at a time with `inter_request_delay` between them.
    pub parallel: bool,
    /// Requested in-flight limit; clamped to `1..=max_concurrency` at run time.
    pub concurrency: usize,
    /// Re-drive failed zones once after `retry_cooldown`.
    pub retry_failed: bool,
    pub inter_request_delay: Duration,
    pub retry_cooldown: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            concurrency: 3,
            retry_failed: true,
            inter_request_delay: Duration::from_millis(500),
            retry_cooldown: Duration::from_secs(2),
        }
    }
}

impl BatchOptions {
    /// In-flight limit actually used for a run capped at `max_concurrency`.
    #[must_use]
    pub fn effective_concurrency(&self, max_concurrency: usize) -> usize {
        if self.parallel {
            self.concurrency.clamp(1, max_concurrency.max(1))
        } else {
            1
        }
    }
}

/// Result of one zone within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrapeOutcome {
    Success {
        zone_code: String,
        record: PrayerTimeRecord,
        /// Succeeded only on the retry pass.
        retried: bool,
    },
    Failure {
        zone_code: String,
        message: String,
    },
}

impl ScrapeOutcome {
    #[must_use]
    pub fn zone_code(&self) -> &str {
        match self {
            Self::Success { zone_code, .. } | Self::Failure { zone_code, .. } => zone_code,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_zones: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub retried: usize,
    pub duration_ms: u64,
    /// One entry per distinct zone, sorted by zone code.
    pub results: Vec<ScrapeOutcome>,
}

impl BatchSummary {
    fn from_outcomes(outcomes: BTreeMap<String, ScrapeOutcome>, started: Instant) -> Self {
        let results: Vec<ScrapeOutcome> = outcomes.into_values().collect();
        let success_count = results.iter().filter(|o| o.is_success()).count();
        let retried = results
            .iter()
            .filter(|o| matches!(o, ScrapeOutcome::Success { retried: true, .. }))
            .count();

        Self {
            total_zones: results.len(),
            success_count,
            failure_count: results.len() - success_count,
            retried,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            results,
        }
    }
}

type PassResults = HashMap<String, Result<PrayerTimeRecord, String>>;

/// Runs `unit` once per distinct zone with at most
/// `options.effective_concurrency(max_concurrency)` calls in flight.
///
/// Failures never abort sibling zones. Once `cancel` fires no further zone
/// is dispatched; in-flight calls finish, the rest are reported as
/// [`CANCELLED`] and the retry pass is skipped.
pub async fn run_batch<F, Fut>(
    zones: &[String],
    options: &BatchOptions,
    max_concurrency: usize,
    cancel: &CancellationToken,
    unit: F,
) -> BatchSummary
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<PrayerTimeRecord, SyncError>>,
{
    let started = Instant::now();
    let zones = distinct_zones(zones);
    let concurrency = options.effective_concurrency(max_concurrency);
    tracing::info!(
        total_zones = zones.len(),
        concurrency,
        retry_failed = options.retry_failed,
        "starting batch scrape"
    );

    let mut first_pass = run_pass(
        zones.clone(),
        concurrency,
        options.inter_request_delay,
        cancel,
        &unit,
    )
    .await;

    let mut outcomes: BTreeMap<String, ScrapeOutcome> = BTreeMap::new();
    for zone in zones {
        let outcome = match first_pass.remove(&zone) {
            Some(Ok(record)) => ScrapeOutcome::Success {
                zone_code: zone.clone(),
                record,
                retried: false,
            },
            Some(Err(message)) => ScrapeOutcome::Failure {
                zone_code: zone.clone(),
                message,
            },
            None => ScrapeOutcome::Failure {
                zone_code: zone.clone(),
                message: CANCELLED.to_string(),
            },
        };
        outcomes.insert(zone, outcome);
    }

    let failed: Vec<String> = outcomes
        .values()
        .filter(|o| !o.is_success())
        .map(|o| o.zone_code().to_string())
        .collect();

    if options.retry_failed && !failed.is_empty() && !cancel.is_cancelled() {
        tracing::info!(
            failed = failed.len(),
            cooldown_ms = u64::try_from(options.retry_cooldown.as_millis()).unwrap_or(u64::MAX),
            "retrying failed zones after cooldown"
        );

        if pause(options.retry_cooldown, cancel).await {
            let second_pass = run_pass(
                failed,
                concurrency,
                options.inter_request_delay,
                cancel,
                &unit,
            )
            .await;

            for (zone, result) in second_pass {
                let outcome = match result {
                    Ok(record) => ScrapeOutcome::Success {
                        zone_code: zone.clone(),
                        record,
                        retried: true,
                    },
                    Err(message) => ScrapeOutcome::Failure {
                        zone_code: zone.clone(),
                        message,
                    },
                };
                outcomes.insert(zone, outcome);
            }
        }
    }

    let summary = BatchSummary::from_outcomes(outcomes, started);
    tracing::info!(
        total_zones = summary.total_zones,
        success_count = summary.success_count,
        failure_count = summary.failure_count,
        retried = summary.retried,
        duration_ms = summary.duration_ms,
        "batch scrape finished"
    );
    summary
}

/// Trimmed, uppercased, first occurrence kept.
fn distinct_zones(zones: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    zones
        .iter()
        .map(|z| z.trim().to_uppercase())
        .filter(|z| !z.is_empty() && seen.insert(z.clone()))
        .collect()
}

async fn run_pass<F, Fut>(
    zones: Vec<String>,
    concurrency: usize,
    inter_request_delay: Duration,
    cancel: &CancellationToken,
    unit: &F,
) -> PassResults
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<PrayerTimeRecord, SyncError>>,
{
    if concurrency <= 1 {
        let mut results = PassResults::new();
        for (index, zone) in zones.into_iter().enumerate() {
            if index > 0 && !pause(inter_request_delay, cancel).await {
                break;
            }
            if cancel.is_cancelled() {
                break;
            }
            let result = unit(zone.clone()).await.map_err(|e| e.to_string());
            results.insert(zone, result);
        }
        return results;
    }

    stream::iter(zones)
        .take_until(cancel.cancelled())
        .map(|zone| {
            let fut = unit(zone.clone());
            async move { (zone, fut.await.map_err(|e| e.to_string())) }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}

/// Sleeps for `delay`; `false` if `cancel` fired first.
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}
