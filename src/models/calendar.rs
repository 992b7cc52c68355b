//! Calendar records consumed by the day classifier.
//!
//! Holidays, suspensions and trainings are authored outside the engine;
//! these types mirror the records the calendar screens produce.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A locally declared holiday (city/provincial or office-specific).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalHoliday {
    /// First day of the holiday.
    pub date: NaiveDate,
    /// Last day, for multi-day holidays.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Holiday name.
    pub name: String,
    /// Where the holiday applies.
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A national holiday as delivered by the external holiday feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalHoliday {
    /// Date of the holiday.
    pub date: NaiveDate,
    /// Holiday name in the local language.
    pub local_name: String,
}

/// A work suspension (weather, emergencies, proclamations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspension {
    /// First day of the suspension.
    pub date: NaiveDate,
    /// Last day, for multi-day suspensions.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Title of the advisory.
    pub title: String,
    /// Scope of the suspension, e.g. "whole day" or "afternoon".
    #[serde(default)]
    pub scope: Option<String>,
}

/// A participant reference on a training record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingParticipant {
    /// Canonical employee id.
    pub emp_id: String,
}

/// A training or seminar that excuses attendance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    /// `[start]` or `[start, end]`.
    pub training_date: Vec<NaiveDate>,
    /// Training title.
    pub name: String,
    /// Employees attending. Empty means the whole office.
    #[serde(default)]
    pub participants: Vec<TrainingParticipant>,
}

fn covers(start: NaiveDate, end: Option<NaiveDate>, date: NaiveDate) -> bool {
    let end = end.unwrap_or(start).max(start);
    date >= start && date <= end
}

impl LocalHoliday {
    /// Checks if the holiday covers a date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        covers(self.date, self.end_date, date)
    }
}

impl Suspension {
    /// Checks if the suspension covers a date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        covers(self.date, self.end_date, date)
    }
}

impl Training {
    /// Checks if the training covers a date. A training with no dates covers nothing.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match (self.training_date.first(), self.training_date.last()) {
            (Some(&start), Some(&end)) => covers(start, Some(end), date),
            _ => false,
        }
    }

    /// Checks if an employee attends. Trainings without a participant list apply to everyone.
    pub fn includes(&self, employee_id: &str) -> bool {
        self.participants.is_empty() || self.participants.iter().any(|p| p.emp_id == employee_id)
    }
}

/// Snapshot of every calendar source the classifier consults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendars {
    /// Locally declared holidays.
    #[serde(default)]
    pub local_holidays: Vec<LocalHoliday>,
    /// National holidays, usually taken from the holiday cache.
    #[serde(default)]
    pub national_holidays: Vec<NationalHoliday>,
    /// Work suspensions.
    #[serde(default)]
    pub suspensions: Vec<Suspension>,
    /// Trainings.
    #[serde(default)]
    pub trainings: Vec<Training>,
}
