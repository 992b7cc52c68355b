//! Daily attendance summary model.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One employee's reconciled punches for one local calendar day.
///
/// Computed on demand from punch logs; never stored by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendanceSummary {
    /// Canonical employee id.
    pub employee_id: String,
    /// Local calendar date.
    pub date: NaiveDate,
    /// Earliest Time In punch.
    pub time_in: Option<NaiveTime>,
    /// Earliest Break Out punch, or 12:00 when defaulted.
    pub break_out: Option<NaiveTime>,
    /// Latest Break In punch, or 13:00 when defaulted.
    pub break_in: Option<NaiveTime>,
    /// Latest Time Out punch.
    pub time_out: Option<NaiveTime>,
    /// Earliest OT In punch.
    pub ot_in: Option<NaiveTime>,
    /// Latest OT Out punch.
    pub ot_out: Option<NaiveTime>,
    /// True when at least one valid punch fell on this day.
    pub has_logs: bool,
    /// Break Out was filled in by default rather than punched.
    pub break_out_defaulted: bool,
    /// Break In was filled in by default rather than punched.
    pub break_in_defaulted: bool,
    /// Valid punches that fell on this day.
    pub punch_count: usize,
    /// Punches that lost the earliest/latest selection for their label.
    pub extra_punches: usize,
}

/// Formats a time the way DTR sheets print it: 12-hour clock, no meridiem.
///
/// ```
/// use chrono::NaiveTime;
/// use dtr_payroll::models::format_dtr_time;
///
/// assert_eq!(format_dtr_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()), "12:00");
/// assert_eq!(format_dtr_time(NaiveTime::from_hms_opt(13, 0, 0).unwrap()), "1:00");
/// assert_eq!(format_dtr_time(NaiveTime::from_hms_opt(7, 5, 0).unwrap()), "7:05");
/// ```
pub fn format_dtr_time(time: NaiveTime) -> String {
    time.format("%-I:%M").to_string()
}

impl DailyAttendanceSummary {
    /// Time In as printed on a DTR sheet.
    pub fn time_in_display(&self) -> Option<String> {
        self.time_in.map(format_dtr_time)
    }

    /// Break Out as printed on a DTR sheet.
    pub fn break_out_display(&self) -> Option<String> {
        self.break_out.map(format_dtr_time)
    }

    /// Break In as printed on a DTR sheet.
    pub fn break_in_display(&self) -> Option<String> {
        self.break_in.map(format_dtr_time)
    }

    /// Time Out as printed on a DTR sheet.
    pub fn time_out_display(&self) -> Option<String> {
        self.time_out.map(format_dtr_time)
    }
}
