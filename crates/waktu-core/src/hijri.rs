//! Tabular (arithmetic) Islamic calendar conversion.
//!
//! Uses the 30-year cycle with leap years 2, 5, 7, 10, 13, 16, 18, 21, 24,
//! 26 and 29. The result may differ by a day from the sighting-based
//! calendar JAKIM publishes.

use chrono::{Datelike, NaiveDate};

/// Day count (`num_days_from_ce`) of 1 Muharram AH 1.
const ISLAMIC_EPOCH: i64 = 227_015;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HijriDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

impl HijriDate {
    #[must_use]
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let fixed = i64::from(date.num_days_from_ce());
        let year = (30 * (fixed - ISLAMIC_EPOCH) + 10_646).div_euclid(10_631);
        let prior_days = fixed - fixed_from_islamic(year, 1, 1);
        let month = (11 * prior_days + 330).div_euclid(325);
        let day = fixed - fixed_from_islamic(year, month, 1) + 1;

        // month is 1..=12 and day 1..=30 by construction of the cycle.
        Self {
            year,
            month: u32::try_from(month).unwrap_or(1),
            day: u32::try_from(day).unwrap_or(1),
        }
    }
}

impl std::fmt::Display for HijriDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.day, self.month, self.year)
    }
}

fn fixed_from_islamic(year: i64, month: i64, day: i64) -> i64 {
    day + 29 * (month - 1)
        + (6 * month - 1).div_euclid(11)
        + (year - 1) * 354
        + (3 + 11 * year).div_euclid(30)
        + ISLAMIC_EPOCH
        - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hijri(y: i32, m: u32, d: u32) -> String {
        HijriDate::from_gregorian(NaiveDate::from_ymd_opt(y, m, d).unwrap()).to_string()
    }

    #[test]
    fn converts_known_dates() {
        assert_eq!(hijri(2026, 10, 17), "05/05/1448");
        assert_eq!(hijri(2024, 3, 12), "02/09/1445");
        assert_eq!(hijri(2025, 3, 1), "01/09/1446");
        assert_eq!(hijri(2000, 1, 1), "24/09/1420");
    }

    #[test]
    fn new_year_lands_on_first_muharram() {
        let date = HijriDate::from_gregorian(NaiveDate::from_ymd_opt(2023, 7, 19).unwrap());
        assert_eq!(
            date,
            HijriDate {
                year: 1445,
                month: 1,
                day: 1
            }
        );
    }

    #[test]
    fn consecutive_days_advance_by_one() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut prev = HijriDate::from_gregorian(start);
        for offset in 1..400 {
            let next = HijriDate::from_gregorian(start + chrono::Days::new(offset));
            let advanced = (next.year == prev.year
                && next.month == prev.month
                && next.day == prev.day + 1)
                || (next.day == 1 && (next.month == prev.month + 1 || next.month == 1));
            assert!(advanced, "{prev:?} -> {next:?}");
            assert!(next.day <= 30);
            prev = next;
        }
    }
}
