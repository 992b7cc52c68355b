//! Day classification against the calendar overlays.
//!
//! This module decides what kind of day a date is for attendance purposes.
//! Sources are consulted in a fixed precedence, highest first:
//!
//! 1. Suspension
//! 2. Holiday (local or national)
//! 3. Training
//! 4. Weekend (Saturday/Sunday)
//! 5. Regular workday

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::Calendars;

/// National holidays whose name contains this text are never observed.
const EXCLUDED_NATIONAL_HOLIDAY: &str = "eid al-adha";

/// The kind of day a date resolves to.
///
/// # Example
///
/// ```
/// use dtr_payroll::calculation::DayKind;
///
/// assert_eq!(DayKind::Suspension.to_string(), "Suspension");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Work suspended; attendance is not expected.
    Suspension,
    /// Local or national holiday.
    Holiday,
    /// Employee is excused for a training.
    Training,
    /// Saturday or Sunday.
    Weekend,
    /// Ordinary working day.
    Regular,
}

impl std::fmt::Display for DayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayKind::Suspension => write!(f, "Suspension"),
            DayKind::Holiday => write!(f, "Holiday"),
            DayKind::Training => write!(f, "Training"),
            DayKind::Weekend => write!(f, "Weekend"),
            DayKind::Regular => write!(f, "Regular"),
        }
    }
}

impl DayKind {
    /// True for days on which attendance is expected.
    pub fn is_workday(self) -> bool {
        self == DayKind::Regular
    }
}

/// The outcome of classifying one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayClassification {
    /// The date classified.
    pub date: NaiveDate,
    /// Winning kind after precedence.
    pub kind: DayKind,
    /// Label shown on the DTR, e.g. the holiday name.
    pub label: String,
    /// Source-specific details (scope, location, holiday source).
    pub metadata: serde_json::Value,
}

/// Checks if a national holiday is one the office never observes.
///
/// ```
/// use dtr_payroll::calculation::is_excluded_national_holiday;
///
/// assert!(is_excluded_national_holiday("Eid al-Adha (Feast of the Sacrifice)"));
/// assert!(!is_excluded_national_holiday("Independence Day"));
/// ```
pub fn is_excluded_national_holiday(name: &str) -> bool {
    name.to_lowercase().contains(EXCLUDED_NATIONAL_HOLIDAY)
}

/// Classifies a date for the whole office.
///
/// Every training covering the date counts, regardless of participants.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use dtr_payroll::calculation::{classify_day, DayKind};
/// use dtr_payroll::models::{Calendars, NationalHoliday, Suspension};
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
/// let calendars = Calendars {
///     national_holidays: vec![NationalHoliday {
///         date,
///         local_name: "Araw ng Kalayaan".to_string(),
///     }],
///     suspensions: vec![Suspension {
///         date,
///         end_date: None,
///         title: "Typhoon signal no. 3".to_string(),
///         scope: None,
///     }],
///     ..Calendars::default()
/// };
///
/// assert_eq!(classify_day(date, &calendars).kind, DayKind::Suspension);
/// ```
pub fn classify_day(date: NaiveDate, calendars: &Calendars) -> DayClassification {
    classify_day_for(date, calendars, None)
}

/// Classifies a date for one employee.
///
/// Trainings only count when the employee is a participant, or when the
/// training lists no participants. With `employee_id` of `None` this is
/// [`classify_day`].
pub fn classify_day_for(
    date: NaiveDate,
    calendars: &Calendars,
    employee_id: Option<&str>,
) -> DayClassification {
    let classification = |kind: DayKind, label: String, metadata: serde_json::Value| {
        DayClassification {
            date,
            kind,
            label,
            metadata,
        }
    };

    if let Some(suspension) = calendars.suspensions.iter().find(|s| s.covers(date)) {
        return classification(
            DayKind::Suspension,
            suspension.title.clone(),
            serde_json::json!({ "scope": suspension.scope }),
        );
    }

    if let Some(holiday) = calendars.local_holidays.iter().find(|h| h.covers(date)) {
        return classification(
            DayKind::Holiday,
            holiday.name.clone(),
            serde_json::json!({
                "source": "local",
                "location": holiday.location,
                "notes": holiday.notes
            }),
        );
    }

    if let Some(holiday) = calendars
        .national_holidays
        .iter()
        .find(|h| h.date == date && !is_excluded_national_holiday(&h.local_name))
    {
        return classification(
            DayKind::Holiday,
            holiday.local_name.clone(),
            serde_json::json!({ "source": "national" }),
        );
    }

    if let Some(training) = calendars.trainings.iter().find(|t| {
        t.covers(date) && employee_id.is_none_or(|employee_id| t.includes(employee_id))
    }) {
        return classification(
            DayKind::Training,
            training.name.clone(),
            serde_json::json!({ "participants": training.participants.len() }),
        );
    }

    match date.weekday() {
        Weekday::Sat | Weekday::Sun => classification(
            DayKind::Weekend,
            date.weekday().to_string(),
            serde_json::Value::Null,
        ),
        _ => classification(DayKind::Regular, String::new(), serde_json::Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocalHoliday, NationalHoliday, Suspension, Training, TrainingParticipant};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn national(d: NaiveDate, name: &str) -> NationalHoliday {
        NationalHoliday {
            date: d,
            local_name: name.to_string(),
        }
    }

    fn training(d: NaiveDate, participants: &[&str]) -> Training {
        Training {
            training_date: vec![d],
            name: "Data Privacy Seminar".to_string(),
            participants: participants
                .iter()
                .map(|id| TrainingParticipant {
                    emp_id: id.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_regular_weekday() {
        // 2025-03-04 is a Tuesday
        let result = classify_day(date(2025, 3, 4), &Calendars::default());
        assert_eq!(result.kind, DayKind::Regular);
        assert!(result.kind.is_workday());
    }

    #[test]
    fn test_weekend() {
        // 2025-03-08 is a Saturday, 2025-03-09 a Sunday
        let calendars = Calendars::default();
        assert_eq!(classify_day(date(2025, 3, 8), &calendars).kind, DayKind::Weekend);
        assert_eq!(classify_day(date(2025, 3, 9), &calendars).label, "Sun");
    }

    #[test]
    fn test_suspension_beats_national_holiday() {
        let d = date(2025, 6, 12);
        let calendars = Calendars {
            national_holidays: vec![national(d, "Araw ng Kalayaan")],
            suspensions: vec![Suspension {
                date: d,
                end_date: None,
                title: "Flooding".to_string(),
                scope: Some("whole day".to_string()),
            }],
            ..Calendars::default()
        };
        let result = classify_day(d, &calendars);
        assert_eq!(result.kind, DayKind::Suspension);
        assert_eq!(result.label, "Flooding");
        assert_eq!(result.metadata["scope"], "whole day");
    }

    #[test]
    fn test_holiday_beats_training_and_weekend() {
        // 2025-08-23 is a Saturday
        let d = date(2025, 8, 23);
        let calendars = Calendars {
            local_holidays: vec![LocalHoliday {
                date: d,
                end_date: None,
                name: "Founding Anniversary".to_string(),
                location: Some("City Hall".to_string()),
                notes: None,
            }],
            trainings: vec![training(d, &[])],
            ..Calendars::default()
        };
        let result = classify_day(d, &calendars);
        assert_eq!(result.kind, DayKind::Holiday);
        assert_eq!(result.metadata["source"], "local");
    }

    #[test]
    fn test_excluded_national_holiday_is_ignored() {
        // 2025-06-06 is a Friday
        let d = date(2025, 6, 6);
        let calendars = Calendars {
            national_holidays: vec![national(d, "Eid al-Adha (Feast of the Sacrifice)")],
            ..Calendars::default()
        };
        assert_eq!(classify_day(d, &calendars).kind, DayKind::Regular);
    }

    #[test]
    fn test_training_scoped_to_participants() {
        let d = date(2025, 3, 5);
        let calendars = Calendars {
            trainings: vec![training(d, &["EMP-001"])],
            ..Calendars::default()
        };
        assert_eq!(classify_day_for(d, &calendars, Some("EMP-001")).kind, DayKind::Training);
        assert_eq!(classify_day_for(d, &calendars, Some("EMP-002")).kind, DayKind::Regular);
        assert_eq!(classify_day(d, &calendars).kind, DayKind::Training);
    }

    #[test]
    fn test_multi_day_suspension() {
        let calendars = Calendars {
            suspensions: vec![Suspension {
                date: date(2025, 7, 21),
                end_date: Some(date(2025, 7, 23)),
                title: "Habagat".to_string(),
                scope: None,
            }],
            ..Calendars::default()
        };
        assert_eq!(classify_day(date(2025, 7, 22), &calendars).kind, DayKind::Suspension);
        assert_eq!(classify_day(date(2025, 7, 24), &calendars).kind, DayKind::Regular);
    }
}
