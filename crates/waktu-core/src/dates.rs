//! Time-of-day and calendar-date normalization shared by both extraction
//! backends and by every store read.
//!
//! The Gregorian date is an opaque `dd/mm/yyyy` string used as half of the
//! record identity. Writers and readers must both go through
//! [`format_gregorian`] so the strings compare equal.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::hijri;

/// Canonical Gregorian date format used for identity matching.
pub const GREGORIAN_FORMAT: &str = "%d/%m/%Y";

/// Minutes between Syuruk and the derived Dhuha time.
const DHUHA_OFFSET_MINUTES: u32 = 15;

/// Truncates `HH:MM:SS` to `HH:MM`. Values without a `:` are returned
/// trimmed but otherwise untouched.
#[must_use]
pub fn normalize_time(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut parts = trimmed.split(':');
    match (parts.next(), parts.next()) {
        (Some(h), Some(m)) => format!("{h}:{m}"),
        _ => trimmed.to_string(),
    }
}

/// Derives Dhuha as Syuruk plus 15 minutes, carrying minutes into the hour.
///
/// Returns `None` when `syuruk` is not an `HH:MM` (or `HH:MM:SS`) value.
#[must_use]
pub fn derive_dhuha(syuruk: &str) -> Option<String> {
    let normalized = normalize_time(syuruk);
    let (h, m) = normalized.split_once(':')?;
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    let total = minutes + DHUHA_OFFSET_MINUTES;
    let hours = (hours + total / 60) % 24;
    Some(format!("{hours:02}:{:02}", total % 60))
}

/// Decodes the handful of HTML entities the upstream emits in the bearing
/// field (degree, prime and double-prime marks).
#[must_use]
pub fn decode_bearing_entities(raw: &str) -> String {
    raw.replace("&#176;", "°")
        .replace("&#8242;", "′")
        .replace("&#8243;", "″")
        .replace("&deg;", "°")
        .replace("&prime;", "′")
        .replace("&Prime;", "″")
        .trim()
        .to_string()
}

/// Formats a date in the canonical `dd/mm/yyyy` form.
#[must_use]
pub fn format_gregorian(date: NaiveDate) -> String {
    date.format(GREGORIAN_FORMAT).to_string()
}

/// Re-stamps an upstream Gregorian date into the canonical form.
///
/// Accepts `17-Oct-2026`, `2026-10-17` and already-canonical `17/10/2026`.
/// Anything else is returned trimmed and verbatim.
#[must_use]
pub fn canonical_gregorian(raw: &str) -> String {
    let trimmed = raw.trim();
    ["%d-%b-%Y", "%Y-%m-%d", GREGORIAN_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map_or_else(|| trimmed.to_string(), format_gregorian)
}

/// Re-stamps an upstream Hijri date (`1448-05-05`) as `05/05/1448`.
///
/// Hijri dates cannot go through `NaiveDate` (day 30 of a 29-day Gregorian
/// month would be rejected), so the fields are re-ordered textually.
#[must_use]
pub fn canonical_hijri(raw: &str) -> String {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split('-').collect();
    match parts.as_slice() {
        [y, m, d]
            if y.len() == 4
                && [y, m, d]
                    .iter()
                    .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())) =>
        {
            format!("{d:0>2}/{m:0>2}/{y}")
        }
        _ => trimmed.to_string(),
    }
}

/// Current calendar date at the given UTC offset.
#[must_use]
pub fn local_today(utc_offset_minutes: i32) -> NaiveDate {
    // Out-of-range offsets are rejected at config load; fall back to UTC.
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset).date_naive()
}

/// Today's Gregorian date string at the given UTC offset.
#[must_use]
pub fn today_gregorian(utc_offset_minutes: i32) -> String {
    format_gregorian(local_today(utc_offset_minutes))
}

/// Today's Hijri date string (`dd/mm/yyyy`) at the given UTC offset.
#[must_use]
pub fn today_hijri(utc_offset_minutes: i32) -> String {
    hijri::HijriDate::from_gregorian(local_today(utc_offset_minutes)).to_string()
}
