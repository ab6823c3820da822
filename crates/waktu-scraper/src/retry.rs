//! Bounded retry around a single [`PrayerTimeSource`] fetch.
//!
//! Every attempt's result is validated against the requested zone before it
//! is accepted. Transport errors, upstream-shape errors and validation
//! failures all count as a failed attempt; nothing propagates past
//! [`fetch_with_retry`] except a [`FetchFailure`] value.

use std::time::Duration;

use thiserror::Error;
use waktu_core::PrayerTimeRecord;

use crate::error::ScraperError;
use crate::source::PrayerTimeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further one.
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Sleep after failed attempt number `attempt` (1-based):
    /// `base_delay * 2^(attempt - 1)`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Why a zone could not be fetched after all attempts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("zone {zone_code}: failed after {attempts} attempt(s): {message}")]
pub struct FetchFailure {
    pub zone_code: String,
    pub attempts: u32,
    /// Display form of the last attempt's error.
    pub message: String,
}

/// Fetches and validates `zone_code`, retrying with exponential backoff.
///
/// # Errors
///
/// Returns a [`FetchFailure`] carrying the last attempt's error once
/// `policy.max_attempts` attempts have all failed.
pub async fn fetch_with_retry(
    source: &dyn PrayerTimeSource,
    zone_code: &str,
    policy: RetryPolicy,
) -> Result<PrayerTimeRecord, FetchFailure> {
    let zone = zone_code.trim().to_uppercase();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let err = match attempt_once(source, &zone).await {
            Ok(record) => {
                if attempt > 1 {
                    tracing::info!(zone = %zone, attempt, source = source.name(), "fetch succeeded after retry");
                }
                return Ok(record);
            }
            Err(err) => err,
        };

        if err.is_validation() {
            tracing::warn!(
                zone = %zone,
                attempt,
                max_attempts,
                source = source.name(),
                error = %err,
                "source returned invalid data"
            );
        } else {
            tracing::warn!(
                zone = %zone,
                attempt,
                max_attempts,
                source = source.name(),
                error = %err,
                "fetch attempt failed"
            );
        }

        if attempt >= max_attempts {
            return Err(FetchFailure {
                zone_code: zone,
                attempts: attempt,
                message: err.to_string(),
            });
        }

        let delay = policy.delay_after(attempt);
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(zone = %zone, delay_ms, "backing off before retry");
        tokio::time::sleep(delay).await;
    }
}

async fn attempt_once(
    source: &dyn PrayerTimeSource,
    zone: &str,
) -> Result<PrayerTimeRecord, ScraperError> {
    let record = source.fetch(zone).await?;
    record.validate(zone)?;
    Ok(record)
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
