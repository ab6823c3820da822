//! Response types for the e-solat `takwimsolat` JSON endpoint.
//!
//! Observed shape for `period=today`:
//!
//! ```json
//! {
//!   "prayerTime": [{
//!     "hijri": "1448-05-05", "date": "17-Oct-2026", "day": "Saturday",
//!     "imsak": "05:44:00", "fajr": "05:54:00", "syuruk": "07:02:00",
//!     "dhuhr": "13:07:00", "asr": "16:11:00", "maghrib": "19:08:00",
//!     "isha": "20:17:00"
//!   }],
//!   "status": "OK!", "zone": "WLY01", "bearing": "292&#176; 31&#8242; 29&#8243;"
//! }
//! ```
//!
//! `dhuha` and `bearing` are absent for some zones. Everything is defaulted
//! so a partial payload deserializes and is rejected by normalization
//! instead of by serde.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TakwimResponse {
    #[serde(rename = "prayerTime", default)]
    pub prayer_time: Vec<TakwimDay>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub bearing: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TakwimDay {
    pub hijri: String,
    pub date: String,
    pub imsak: String,
    pub fajr: String,
    pub syuruk: String,
    pub dhuha: Option<String>,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}
