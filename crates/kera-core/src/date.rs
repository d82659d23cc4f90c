//! Day-precision UTC calendar dates.
//!
//! A [`Date`] never carries a time of day. Anything derived from a wall
//! clock is truncated to midnight UTC on construction, so equality and
//! ordering are always per calendar day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Earliest year a history may be requested for.
pub const MIN_YEAR: i32 = 2024;

/// A calendar day in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Build a date from its components.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDate`] when the components do not
    /// name a real calendar day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(ValidationError::InvalidDate)
    }

    /// Truncate a timestamp to its UTC calendar day.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    /// Current UTC day. Only clock implementations should call this.
    pub fn today() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Parse an ISO `YYYY-MM-DD` string.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDate`] on any other shape.
    pub fn parse_iso(s: &str) -> Result<Self, ValidationError> {
        // chrono alone also takes "2024-7-5" and "+2024-07-05".
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(ValidationError::InvalidDate);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Day of the month, starting at 1.
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Weekday index with Monday = 0 and Sunday = 6.
    pub fn weekday_index(self) -> u8 {
        self.0.weekday().num_days_from_monday() as u8
    }

    pub fn add_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Whole days from `earlier` to `self`; negative when `earlier` is later.
    pub fn days_since(self, earlier: Date) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    pub fn first_of_month(self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    pub fn last_of_month(self) -> Self {
        self.first_of_month()
            .add_days(i64::from(self.days_in_month()) - 1)
    }

    /// Number of days in the month containing `self` (28-31).
    pub fn days_in_month(self) -> u32 {
        let (year, month) = (self.0.year(), self.0.month());
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        match next {
            Some(next) => (next - self.first_of_month().0).num_days() as u32,
            None => 31,
        }
    }

    pub fn before(self, other: Date) -> bool {
        self < other
    }

    pub fn after(self, other: Date) -> bool {
        self > other
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Date {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_iso(s)
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

/// Check a requested history year against `[min_year, today.year() + 1]`.
///
/// # Errors
/// Returns [`ValidationError::InvalidYear`] when out of range.
pub fn validate_year(year: i32, today: Date, min_year: i32) -> Result<(), ValidationError> {
    if year < min_year || year > today.year() + 1 {
        return Err(ValidationError::InvalidYear);
    }
    Ok(())
}

/// # Errors
/// Returns [`ValidationError::InvalidMonth`] unless `1 <= month <= 12`.
pub fn validate_month(month: u32) -> Result<(), ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth);
    }
    Ok(())
}

/// Validate a (year, month) request and return the first day of that month.
///
/// # Errors
/// Returns the year or month validation error.
pub fn month_anchor(
    year: i32,
    month: u32,
    today: Date,
    min_year: i32,
) -> Result<Date, ValidationError> {
    validate_year(year, today, min_year)?;
    validate_month(month)?;
    Date::from_ymd(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn truncates_time_of_day() {
        let at = DateTime::parse_from_rfc3339("2024-07-15T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(Date::from_datetime(at), d(2024, 7, 15));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(d(2024, 2, 10).days_in_month(), 29);
        assert_eq!(d(2025, 2, 10).days_in_month(), 28);
        assert_eq!(d(2024, 7, 31).days_in_month(), 31);
        assert_eq!(d(2024, 4, 1).days_in_month(), 30);
        assert_eq!(d(2024, 12, 5).days_in_month(), 31);
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(d(2024, 7, 15).first_of_month(), d(2024, 7, 1));
        assert_eq!(d(2024, 2, 3).last_of_month(), d(2024, 2, 29));
        assert_eq!(d(2024, 1, 31).add_days(1), d(2024, 2, 1));
        assert_eq!(d(2024, 3, 1).add_days(-1), d(2024, 2, 29));
    }

    #[test]
    fn weekday_index_is_monday_first() {
        // 2024-07-01 was a Monday
        assert_eq!(d(2024, 7, 1).weekday_index(), 0);
        assert_eq!(d(2024, 7, 7).weekday_index(), 6);
        // 2024-05-01 was a Wednesday
        assert_eq!(d(2024, 5, 1).weekday_index(), 2);
    }

    #[test]
    fn comparisons() {
        assert!(d(2024, 7, 1).before(d(2024, 7, 2)));
        assert!(d(2024, 7, 2).after(d(2024, 7, 1)));
        assert!(!d(2024, 7, 2).after(d(2024, 7, 2)));
        assert_eq!(d(2024, 7, 31).days_since(d(2024, 7, 24)), 7);
        assert_eq!(d(2024, 7, 24).days_since(d(2024, 7, 31)), -7);
    }

    #[test]
    fn parse_and_display_iso() {
        let date: Date = "2024-07-15".parse().unwrap();
        assert_eq!(date, d(2024, 7, 15));
        assert_eq!(date.to_string(), "2024-07-15");
        assert_eq!(Date::parse_iso("15/07/2024"), Err(ValidationError::InvalidDate));
        assert_eq!(Date::parse_iso("2024-02-30"), Err(ValidationError::InvalidDate));
    }

    #[test]
    fn parse_iso_requires_exact_shape() {
        for input in [
            "2024-7-5",
            "2024-07-5",
            "+2024-07-05",
            " 2024-07-05",
            "2024-07-05 ",
            "2024-07-05x",
            "2024/07/05",
            "",
        ] {
            assert_eq!(
                Date::parse_iso(input),
                Err(ValidationError::InvalidDate),
                "{input:?}"
            );
        }
        assert_eq!(Date::parse_iso("2024-07-05"), Ok(d(2024, 7, 5)));
    }

    #[test]
    fn serializes_as_iso_string() {
        let json = serde_json::to_string(&d(2024, 7, 1)).unwrap();
        assert_eq!(json, "\"2024-07-01\"");
    }

    #[test]
    fn year_range_follows_today() {
        let today = d(2025, 6, 1);
        assert!(validate_year(2024, today, MIN_YEAR).is_ok());
        assert!(validate_year(2026, today, MIN_YEAR).is_ok());
        assert_eq!(validate_year(2023, today, MIN_YEAR), Err(ValidationError::InvalidYear));
        assert_eq!(validate_year(2027, today, MIN_YEAR), Err(ValidationError::InvalidYear));
    }

    #[test]
    fn month_range() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert_eq!(validate_month(0), Err(ValidationError::InvalidMonth));
        assert_eq!(validate_month(13), Err(ValidationError::InvalidMonth));
        assert_eq!(month_anchor(2024, 7, d(2024, 8, 1), MIN_YEAR), Ok(d(2024, 7, 1)));
    }
}
