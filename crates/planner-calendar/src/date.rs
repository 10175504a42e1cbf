//! Civil-date arithmetic over `YYYY-MM-DD` dates.
//!
//! All arithmetic happens in UTC day space through chrono's proleptic
//! Gregorian calendar, so there is no local-timezone drift.
//!
//! `CivilDate` orders by `(year, month, day)`, which is the same order as
//! comparing the zero-padded ISO strings. That lets the layout code compare
//! against "virtual" boundaries such as day 32 of a month, the way a string
//! compare against `"2024-01-32"` would.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DateError;

// ASCII digits only; `\d` would also accept other Unicode digits.
#[allow(clippy::expect_used)]
static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid ISO date regex")
});

/// A calendar day with no time-of-day or timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CivilDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CivilDate {
    /// Build a validated date. Returns `None` for impossible dates.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_naive)
    }

    /// Build a date without validating the day of month.
    ///
    /// Used for comparison keys like "day after the last day of the month".
    pub(crate) const fn from_parts(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    /// Strict `^\d{4}-\d{2}-\d{2}$` parse.
    ///
    /// Day-of-month overflow such as `2023-02-30` is accepted here and
    /// rolled forward by [`CivilDate::normalized`] and [`CivilDate::add_days`].
    pub fn parse(iso: &str) -> Result<Self, DateError> {
        let invalid = || DateError::InvalidFormat(iso.to_string());
        let caps = ISO_DATE_RE.captures(iso).ok_or_else(invalid)?;

        let number = |i: usize| caps[i].parse::<u32>().map_err(|_| invalid());
        let year = number(1)?;
        let month = number(2)?;
        let day = number(3)?;

        Ok(Self::from_parts(year as i32, month, day))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// The real chrono date, rolling month and day overflow forward the
    /// way `Date.UTC` does (`2023-02-30` becomes March 2nd).
    pub fn to_naive(self) -> NaiveDate {
        let months = i64::from(self.year) * 12 + i64::from(self.month) - 1;
        let year = months.div_euclid(12) as i32;
        let month = months.rem_euclid(12) as u32 + 1;

        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
        shift(first, i64::from(self.day) - 1)
    }

    /// The same day with any overflow rolled into a real date.
    pub fn normalized(self) -> Self {
        Self::from_naive(self.to_naive())
    }

    /// Move `days` whole days forward (or backward when negative).
    ///
    /// Saturates at the ends of chrono's representable range.
    pub fn add_days(self, days: i64) -> Self {
        Self::from_naive(shift(self.to_naive(), days))
    }

    /// Day of week, 0 = Sunday .. 6 = Saturday.
    pub fn day_of_week(self) -> u32 {
        self.to_naive().weekday().num_days_from_sunday()
    }

    /// Whole days from `self` to `other` (negative when `other` is earlier).
    pub fn days_until(self, other: CivilDate) -> i64 {
        (other.to_naive() - self.to_naive()).num_days()
    }
}

fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(magnitude).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for CivilDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CivilDate {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CivilDate> for String {
    fn from(date: CivilDate) -> Self {
        date.to_string()
    }
}

impl From<NaiveDate> for CivilDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_naive(date)
    }
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_iso_date(iso: &str) -> Result<CivilDate, DateError> {
    CivilDate::parse(iso)
}

/// Format a date as `YYYY-MM-DD`, zero-padding month and day.
pub fn format_iso_date(year: i32, month: u32, day: u32) -> String {
    CivilDate::from_parts(year, month, day).to_string()
}

/// Add (or subtract) whole days to an ISO date string.
pub fn add_days_iso(iso: &str, days: i64) -> Result<String, DateError> {
    Ok(CivilDate::parse(iso)?.add_days(days).to_string())
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week_iso(iso: &str) -> Result<u32, DateError> {
    Ok(CivilDate::parse(iso)?.day_of_week())
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1..=12) of `year`; 0 for any other month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn d(iso: &str) -> CivilDate {
        CivilDate::parse(iso).unwrap()
    }

    #[test]
    fn test_parse_and_format() {
        let date = d("2024-03-09");
        assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 9));
        assert_eq!(date.to_string(), "2024-03-09");
        assert_eq!(format_iso_date(2024, 3, 9), "2024-03-09");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["2024-3-09", "24-03-09", "2024/03/09", "2024-03-09T00:00", "", "2024-0a-01", "+024-03-09", "٢٠٢٤-03-09"] {
            assert_eq!(
                CivilDate::parse(bad),
                Err(DateError::InvalidFormat(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_add_days_leap_years() {
        assert_eq!(add_days_iso("2024-02-28", 1).unwrap(), "2024-02-29");
        assert_eq!(add_days_iso("2023-02-28", 1).unwrap(), "2023-03-01");
        assert_eq!(add_days_iso("2000-02-28", 1).unwrap(), "2000-02-29");
        assert_eq!(add_days_iso("1900-02-28", 1).unwrap(), "1900-03-01");
    }

    #[test]
    fn test_add_days_crosses_year() {
        assert_eq!(add_days_iso("2023-12-31", 1).unwrap(), "2024-01-01");
        assert_eq!(add_days_iso("2024-01-01", -1).unwrap(), "2023-12-31");
        assert_eq!(add_days_iso("2024-01-01", 366).unwrap(), "2025-01-01");
    }

    #[test]
    fn test_add_days_round_trip() {
        let mut date = d("2023-11-15");
        for step in 0..800 {
            let n = step * 7 - 2000;
            assert_eq!(date.add_days(n).add_days(-n), date);
            date = date.add_days(1);
        }
    }

    #[test]
    fn test_overflowing_day_rolls_forward() {
        assert_eq!(add_days_iso("2023-02-30", 0).unwrap(), "2023-03-02");
        assert_eq!(d("2024-01-32").normalized(), d("2024-02-01"));
        assert_eq!(d("2024-13-01").normalized(), d("2025-01-01"));
    }

    #[test]
    fn test_day_of_week() {
        assert_eq!(day_of_week_iso("2024-01-07").unwrap(), 0);
        assert_eq!(day_of_week_iso("2024-01-06").unwrap(), 6);
        assert_eq!(day_of_week_iso("2024-02-29").unwrap(), 4);
        assert!(day_of_week_iso("not a date").is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn test_ordering_matches_iso_strings() {
        let dates = ["2024-01-09", "2024-01-10", "2023-12-31", "2024-10-01", "2024-09-30"];
        let mut by_date: Vec<CivilDate> = dates.iter().map(|s| d(s)).collect();
        let mut by_string: Vec<&str> = dates.to_vec();
        by_date.sort();
        by_string.sort();
        let formatted: Vec<String> = by_date.iter().map(ToString::to_string).collect();
        assert_eq!(formatted, by_string);
    }

    #[test]
    fn test_days_until() {
        assert_eq!(d("2024-01-05").days_until(d("2024-01-10")), 5);
        assert_eq!(d("2024-03-01").days_until(d("2024-02-28")), -2);
    }

    #[test]
    fn test_serde_as_iso_string() {
        let json = serde_json::to_string(&d("2024-07-04")).unwrap();
        assert_eq!(json, "\"2024-07-04\"");

        let back: CivilDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d("2024-07-04"));
        assert!(serde_json::from_str::<CivilDate>("\"2024-7-4\"").is_err());
    }
}
