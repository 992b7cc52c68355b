//! Date ranges and payroll cut-off records.
//!
//! This module contains the [`DateRange`] used by every period-shaped
//! calculation and the [`CutOffRecord`] that payroll staff select.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Returns the number of days in the month containing `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use dtr_payroll::models::days_in_month;
///
/// assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()), 29);
/// assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()), 28);
/// assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()), 31);
/// ```
pub fn days_in_month(date: NaiveDate) -> u32 {
    last_day_of_month(date).day()
}

/// Returns the last date of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use dtr_payroll::models::DateRange;
/// use chrono::NaiveDate;
///
/// let march = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
/// ).unwrap();
///
/// assert!(march.is_full_month());
/// assert_eq!(march.num_days(), 31);
/// assert!(march.contains(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First date (inclusive).
    pub start: NaiveDate,
    /// Last date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, or `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Checks if a date falls within the range (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the range, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// True when the range is exactly one calendar month.
    pub fn is_full_month(&self) -> bool {
        self.start.day() == 1 && self.end == last_day_of_month(self.start)
    }

    /// Iterates the dates in the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        (0..self.num_days()).map(move |offset| start + Duration::days(offset))
    }

    /// The first half (1st-15th) of the month containing `date`.
    pub fn first_half_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = date.with_day(15).unwrap_or(date);
        Self { start, end }
    }

    /// The second half (16th-end) of the month containing `date`.
    pub fn second_half_of(date: NaiveDate) -> Self {
        let start = date.with_day(16).unwrap_or(date);
        Self {
            start,
            end: last_day_of_month(date),
        }
    }
}

/// Which half of a month a line item or cut-off belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CutOffBucket {
    /// Days 1-15.
    First,
    /// Days 16-end.
    Second,
}

impl CutOffBucket {
    /// The bucket a period starting on `start` belongs to.
    pub fn for_start(start: NaiveDate) -> Self {
        if start.day() <= 15 {
            CutOffBucket::First
        } else {
            CutOffBucket::Second
        }
    }
}

impl TryFrom<u8> for CutOffBucket {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CutOffBucket::First),
            2 => Ok(CutOffBucket::Second),
            other => Err(format!("cut-off bucket must be 1 or 2, got {other}")),
        }
    }
}

impl From<CutOffBucket> for u8 {
    fn from(bucket: CutOffBucket) -> Self {
        match bucket {
            CutOffBucket::First => 1,
            CutOffBucket::Second => 2,
        }
    }
}

/// A payroll cut-off as stored by the payroll office.
///
/// Some stored records encode their shape in the name ("1-15",
/// "16-30") instead of carrying consistent dates, so the dates are
/// optional and the name is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutOffRecord {
    /// Record name, e.g. "March 2025 1-15".
    pub name: String,
    /// First day of the period.
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    /// Last day of the period.
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
}

impl CutOffRecord {
    /// The stored date range, if both dates exist and are ordered.
    pub fn stored_range(&self) -> Option<DateRange> {
        DateRange::new(self.period_start?, self.period_end?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(DateRange::new(date(2025, 3, 16), date(2025, 3, 1)).is_none());
        assert!(DateRange::new(date(2025, 3, 1), date(2025, 3, 1)).is_some());
    }

    #[test]
    fn test_num_days_is_inclusive() {
        let range = DateRange::new(date(2025, 3, 1), date(2025, 3, 15)).unwrap();
        assert_eq!(range.num_days(), 15);
        assert_eq!(range.days().count(), 15);
    }

    #[test]
    fn test_days_cross_month_boundary() {
        let range = DateRange::new(date(2025, 1, 30), date(2025, 2, 2)).unwrap();
        let days: Vec<u32> = range.days().map(|d| d.day()).collect();
        assert_eq!(days, vec![30, 31, 1, 2]);
    }

    #[test]
    fn test_is_full_month() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap().is_full_month());
        assert!(!DateRange::new(date(2024, 2, 1), date(2024, 2, 28)).unwrap().is_full_month());
        assert!(!DateRange::new(date(2024, 2, 1), date(2024, 3, 31)).unwrap().is_full_month());
    }

    #[test]
    fn test_halves_of_month() {
        let first = DateRange::first_half_of(date(2025, 4, 20));
        assert_eq!(first.start, date(2025, 4, 1));
        assert_eq!(first.end, date(2025, 4, 15));

        let second = DateRange::second_half_of(date(2025, 4, 2));
        assert_eq!(second.start, date(2025, 4, 16));
        assert_eq!(second.end, date(2025, 4, 30));
    }

    #[test]
    fn test_bucket_serializes_as_number() {
        assert_eq!(serde_json::to_string(&CutOffBucket::First).unwrap(), "1");
        let bucket: CutOffBucket = serde_json::from_str("2").unwrap();
        assert_eq!(bucket, CutOffBucket::Second);
        assert!(serde_json::from_str::<CutOffBucket>("3").is_err());
    }

    #[test]
    fn test_bucket_for_start() {
        assert_eq!(CutOffBucket::for_start(date(2025, 3, 1)), CutOffBucket::First);
        assert_eq!(CutOffBucket::for_start(date(2025, 3, 15)), CutOffBucket::First);
        assert_eq!(CutOffBucket::for_start(date(2025, 3, 16)), CutOffBucket::Second);
    }

    #[test]
    fn test_stored_range_requires_both_dates() {
        let record = CutOffRecord {
            name: "custom".to_string(),
            period_start: Some(date(2025, 3, 3)),
            period_end: None,
        };
        assert!(record.stored_range().is_none());
    }

    #[test]
    fn test_deserialize_cutoff_record() {
        let json = r#"{ "name": "March 2025 1-15", "period_start": "2025-03-01", "period_end": "2025-03-15" }"#;
        let record: CutOffRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "March 2025 1-15");
        assert_eq!(record.stored_range().unwrap().num_days(), 15);
    }
}
