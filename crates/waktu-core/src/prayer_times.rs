use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::{format_gregorian, GREGORIAN_FORMAT};

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid time regex"));

/// One zone's schedule for one calendar day.
///
/// `gregorian_date` is the canonical `dd/mm/yyyy` string produced by
/// [`crate::dates::format_gregorian`]; together with the bare zone code it
/// identifies the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimeRecord {
    pub zone_label: String,
    pub bearing: String,
    pub gregorian_date: String,
    pub hijri_date: String,
    pub imsak: String,
    pub subuh: String,
    pub syuruk: String,
    pub dhuha: String,
    pub zohor: String,
    pub asar: String,
    pub maghrib: String,
    pub isyak: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no zone code was requested")]
    BlankZone,

    #[error("source returned zone label \"{label}\" for requested zone {requested}")]
    ZoneMismatch { requested: String, label: String },

    #[error("{field} is not an HH:MM time: \"{value}\"")]
    MalformedTime { field: &'static str, value: String },

    #[error("gregorian date is not dd/mm/yyyy: \"{0}\"")]
    MalformedDate(String),
}

/// Bare zone code embedded in a zone label: everything before the first
/// `-`, trimmed and uppercased. Labels without a `-` are used whole.
#[must_use]
pub fn bare_zone_code(label: &str) -> String {
    label
        .split_once('-')
        .map_or(label, |(code, _)| code)
        .trim()
        .to_uppercase()
}

impl PrayerTimeRecord {
    /// Normalized zone code used as the storage identity.
    #[must_use]
    pub fn zone_code(&self) -> String {
        bare_zone_code(&self.zone_label)
    }

    /// The eight schedule fields, in display order.
    #[must_use]
    pub fn times(&self) -> [(&'static str, &str); 8] {
        [
            ("imsak", &self.imsak),
            ("subuh", &self.subuh),
            ("syuruk", &self.syuruk),
            ("dhuha", &self.dhuha),
            ("zohor", &self.zohor),
            ("asar", &self.asar),
            ("maghrib", &self.maghrib),
            ("isyak", &self.isyak),
        ]
    }

    /// Strict acceptance check for a freshly extracted record.
    ///
    /// The requested zone must be non-blank and contained in the label
    /// (case-insensitive), the Gregorian date must be canonical `dd/mm/yyyy`
    /// and every time field must be a non-empty `HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, requested_zone: &str) -> Result<(), ValidationError> {
        let requested = requested_zone.trim().to_uppercase();
        if requested.is_empty() {
            return Err(ValidationError::BlankZone);
        }
        if !self.zone_label.to_uppercase().contains(&requested) {
            return Err(ValidationError::ZoneMismatch {
                requested,
                label: self.zone_label.clone(),
            });
        }

        if !is_canonical_gregorian(&self.gregorian_date) {
            return Err(ValidationError::MalformedDate(self.gregorian_date.clone()));
        }

        for (field, value) in self.times() {
            if !TIME_RE.is_match(value) {
                return Err(ValidationError::MalformedTime {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Whether a stored record may be surfaced as "found": Subuh, Zohor and
    /// Asar must all be present. Legacy rows may lack Dhuha.
    #[must_use]
    pub fn is_minimum_viable(&self) -> bool {
        [&self.subuh, &self.zohor, &self.asar]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

// Readers look rows up by `format_gregorian(today)`; anything else is unreachable.
fn is_canonical_gregorian(value: &str) -> bool {
    NaiveDate::parse_from_str(value, GREGORIAN_FORMAT)
        .is_ok_and(|date| format_gregorian(date) == value)
}

#[cfg(test)]
#[path = "prayer_times_test.rs"]
mod tests;
