//! Cut-off period resolution.
//!
//! Stored cut-off records do not always carry consistent dates; many were
//! created with names like "March 2025 1-15" and whatever dates the form
//! defaulted to. The name therefore wins when it names a half of the month.

use chrono::Datelike;

use crate::models::{CutOffRecord, DateRange, days_in_month};

/// Which half of the month a cut-off name points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HalfMarker {
    First,
    Second,
}

const FIRST_HALF_WORDS: [&str; 2] = ["first half", "1st half"];
const SECOND_HALF_WORDS: [&str; 2] = ["second half", "2nd half"];
const SECOND_HALF_ENDS: [&str; 5] = ["28", "29", "30", "31", "end"];

fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace(['–', '—'], "-");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" -", "-").replace("- ", "-")
}

/// Finds `needle` in `haystack` where it is not glued to other digits.
fn contains_numeric_token(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + needle.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

fn half_marker(name: &str) -> Option<HalfMarker> {
    let name = normalize_name(name);

    if contains_numeric_token(&name, "1-15") || FIRST_HALF_WORDS.iter().any(|w| name.contains(w)) {
        return Some(HalfMarker::First);
    }

    let second_range = SECOND_HALF_ENDS
        .iter()
        .any(|end| contains_numeric_token(&name, &format!("16-{end}")));
    if second_range || SECOND_HALF_WORDS.iter().any(|w| name.contains(w)) {
        return Some(HalfMarker::Second);
    }

    None
}

/// Returns the days of the month a cut-off covers.
///
/// A first-half name yields 1-15 and a second-half name yields 16 through
/// the end of the period's month (31 when the record has no dates).
/// Anything else walks the stored dates, giving an empty list when they
/// are missing or inverted.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dtr_payroll::calculation::resolve_cutoff_days;
/// use dtr_payroll::models::CutOffRecord;
///
/// let record = CutOffRecord {
///     name: "1-15".to_string(),
///     period_start: Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
///     period_end: Some(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()),
/// };
/// assert_eq!(resolve_cutoff_days(&record), (1..=15).collect::<Vec<u32>>());
/// ```
pub fn resolve_cutoff_days(record: &CutOffRecord) -> Vec<u32> {
    match half_marker(&record.name) {
        Some(HalfMarker::First) => (1..=15).collect(),
        Some(HalfMarker::Second) => {
            let last = record
                .period_start
                .or(record.period_end)
                .map(days_in_month)
                .unwrap_or(31);
            (16..=last).collect()
        }
        None => record
            .stored_range()
            .map(|range| range.days().map(|d| d.day()).collect())
            .unwrap_or_default(),
    }
}

/// Resolves a cut-off record into concrete dates.
///
/// Uses the same name rules as [`resolve_cutoff_days`], anchored on the
/// month of `period_start` (or `period_end` when the start is missing).
/// Returns `None` when no valid range can be formed.
pub fn resolve_cutoff_range(record: &CutOffRecord) -> Option<DateRange> {
    let anchor = record.period_start.or(record.period_end);
    match half_marker(&record.name) {
        Some(HalfMarker::First) => anchor.map(DateRange::first_half_of),
        Some(HalfMarker::Second) => anchor.map(DateRange::second_half_of),
        None => record.stored_range(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(name: &str, start: Option<(i32, u32, u32)>, end: Option<(i32, u32, u32)>) -> CutOffRecord {
        let to_date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        CutOffRecord {
            name: name.to_string(),
            period_start: start.map(to_date),
            period_end: end.map(to_date),
        }
    }

    #[test]
    fn test_first_half_name_overrides_dates() {
        let r = record("March 2025 1-15", Some((2025, 3, 1)), Some((2025, 3, 31)));
        assert_eq!(resolve_cutoff_days(&r), (1..=15).collect::<Vec<u32>>());

        let range = resolve_cutoff_range(&r).unwrap();
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn test_first_half_variants() {
        for name in ["1 - 15", "First Half", "1st half of April", "1–15"] {
            let r = record(name, Some((2025, 4, 1)), Some((2025, 4, 30)));
            assert_eq!(resolve_cutoff_days(&r).len(), 15, "name: {name}");
        }
    }

    #[test]
    fn test_digit_boundary_prevents_false_match() {
        // "11-15" must not read as "1-15"
        let r = record("11-15", Some((2025, 3, 11)), Some((2025, 3, 15)));
        assert_eq!(resolve_cutoff_days(&r), vec![11, 12, 13, 14, 15]);

        // "1-150" is not a half-month marker either
        assert_eq!(half_marker("batch 1-150"), None);
    }

    #[test]
    fn test_second_half_uses_month_length() {
        let feb = record("16-28", Some((2025, 2, 16)), Some((2025, 2, 28)));
        assert_eq!(resolve_cutoff_days(&feb), (16..=28).collect::<Vec<u32>>());

        let leap = record("February 2024 16-end", Some((2024, 2, 1)), None);
        assert_eq!(*resolve_cutoff_days(&leap).last().unwrap(), 29);

        let range = resolve_cutoff_range(&leap).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 16).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_second_half_without_dates_defaults_to_31() {
        let r = record("2nd half", None, None);
        assert_eq!(resolve_cutoff_days(&r), (16..=31).collect::<Vec<u32>>());
        assert!(resolve_cutoff_range(&r).is_none());
    }

    #[test]
    fn test_custom_range_walks_dates() {
        let r = record("Special payroll", Some((2025, 1, 30)), Some((2025, 2, 2)));
        assert_eq!(resolve_cutoff_days(&r), vec![30, 31, 1, 2]);
        assert_eq!(resolve_cutoff_range(&r).unwrap().num_days(), 4);
    }

    #[test]
    fn test_invalid_range_is_empty() {
        let inverted = record("Broken", Some((2025, 3, 20)), Some((2025, 3, 1)));
        assert!(resolve_cutoff_days(&inverted).is_empty());
        assert!(resolve_cutoff_range(&inverted).is_none());

        let missing = record("Broken", Some((2025, 3, 1)), None);
        assert!(resolve_cutoff_days(&missing).is_empty());
    }

    #[test]
    fn test_name_anchor_falls_back_to_end_date() {
        let r = record("1-15", None, Some((2025, 5, 15)));
        let range = resolve_cutoff_range(&r).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    }
}
