use chrono::Utc;
use waktu_core::dates::{canonical_gregorian, canonical_hijri, decode_bearing_entities};
use waktu_core::{derive_dhuha, normalize_time, PrayerTimeRecord};

use crate::error::ScraperError;
use crate::types::TakwimResponse;

const STATUS_OK: &str = "OK!";

/// Converts a `takwimsolat` response into a [`PrayerTimeRecord`].
///
/// Takes the first day entry. Times are truncated to `HH:MM`, a missing
/// Dhuha is derived from Syuruk, bearing entities are decoded and both dates
/// are re-stamped as `dd/mm/yyyy`. Zones without a bearing carry their zone
/// code in `bearing` and a bare label.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidPayload`] when the status sentinel is not
/// `OK!`, there are no day entries, or the day has no Gregorian date.
pub fn normalize_takwim(
    requested_zone: &str,
    response: TakwimResponse,
) -> Result<PrayerTimeRecord, ScraperError> {
    let zone = requested_zone.trim().to_uppercase();

    if response.status.trim() != STATUS_OK {
        return Err(ScraperError::InvalidPayload {
            zone,
            reason: format!("status was \"{}\"", response.status),
        });
    }

    let Some(day) = response.prayer_time.into_iter().next() else {
        return Err(ScraperError::InvalidPayload {
            zone,
            reason: "no prayer time entries".to_string(),
        });
    };

    if day.date.trim().is_empty() {
        return Err(ScraperError::InvalidPayload {
            zone,
            reason: "no gregorian date".to_string(),
        });
    }

    let label_zone = response
        .zone
        .map(|z| z.trim().to_uppercase())
        .filter(|z| !z.is_empty())
        .unwrap_or(zone);
    let decoded = response
        .bearing
        .as_deref()
        .map(decode_bearing_entities)
        .filter(|b| !b.is_empty());
    let (zone_label, bearing) = match decoded {
        Some(bearing) => (format!("{label_zone} - {bearing}"), bearing),
        None => (label_zone.clone(), label_zone),
    };

    let syuruk = normalize_time(&day.syuruk);
    let dhuha = match day.dhuha.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => normalize_time(d),
        _ => derive_dhuha(&syuruk).unwrap_or_default(),
    };

    Ok(PrayerTimeRecord {
        zone_label,
        bearing,
        gregorian_date: canonical_gregorian(&day.date),
        hijri_date: canonical_hijri(&day.hijri),
        imsak: normalize_time(&day.imsak),
        subuh: normalize_time(&day.fajr),
        syuruk,
        dhuha,
        zohor: normalize_time(&day.dhuhr),
        asar: normalize_time(&day.asr),
        maghrib: normalize_time(&day.maghrib),
        isyak: normalize_time(&day.isha),
        created_at: Utc::now(),
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
