//! Attendance ledger and daily time records.
//!
//! The [`AttendanceLedger`] ingests one snapshot of raw punches against a
//! roster: identifiers are resolved, labels and timestamps are parsed, and
//! the survivors are aggregated into per-day summaries. Punches that cannot
//! be used are counted in [`IngestStats`] and never reach a summary.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use dtr_payroll::attendance::AttendanceLedger;
//! use dtr_payroll::config::EngineSettings;
//! use dtr_payroll::models::{Employee, EmployeeType, RawPunch, SalaryInfo};
//! use rust_decimal::Decimal;
//!
//! let roster = vec![Employee {
//!     emp_id: "EMP-001".to_string(),
//!     emp_no: None,
//!     ac_no: Some("0045".to_string()),
//!     alternate_emp_ids: vec![],
//!     name: "Santos, Maria".to_string(),
//!     normalized_name: None,
//!     employee_type: EmployeeType::Regular,
//!     division: None,
//!     section_or_unit: None,
//!     position: None,
//!     salary_info: SalaryInfo {
//!         rate_per_month: Decimal::new(20000, 0),
//!         daily_rate: None,
//!         basic_salary: None,
//!     },
//! }];
//! let punches = vec![RawPunch {
//!     identifier_raw: "45".to_string(),
//!     time: "2025-03-03T07:58:00".to_string(),
//!     state: "Check In".to_string(),
//! }];
//!
//! let ledger = AttendanceLedger::ingest(&roster, &punches, &EngineSettings::default());
//! let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let summary = ledger.get_daily_attendance_summary("EMP-001", day).unwrap();
//! assert_eq!(summary.break_out_display().as_deref(), Some("12:00"));
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::{
    DayClassification, IdentityIndex, aggregate_by_day, classify_day_for, resolve_cutoff_range,
    run_isolated,
};
use crate::config::{AttendanceSettings, EngineSettings};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Calendars, CutOffRecord, DailyAttendanceSummary, DateRange, Employee, PunchLog, PunchState,
    RawPunch,
};

/// Counts from one ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Raw punches received.
    pub total: usize,
    /// Punches kept.
    pub accepted: usize,
    /// Identifier matched no employee.
    pub unresolved: usize,
    /// Timestamp could not be parsed.
    pub malformed: usize,
    /// State label matched no known punch state.
    pub unknown_state: usize,
    /// Identity keys claimed by more than one employee.
    pub identity_collisions: usize,
}

/// Resolved, aggregated attendance for one roster snapshot.
#[derive(Debug, Clone)]
pub struct AttendanceLedger {
    employees: HashMap<String, Employee>,
    days: HashMap<String, BTreeMap<NaiveDate, DailyAttendanceSummary>>,
    office: AttendanceSettings,
    stats: IngestStats,
}

impl AttendanceLedger {
    /// Resolves, parses and aggregates a punch snapshot.
    pub fn ingest(roster: &[Employee], raw_punches: &[RawPunch], settings: &EngineSettings) -> Self {
        let index = IdentityIndex::build(roster);
        let offset = settings.local_offset();
        let mut stats = IngestStats {
            total: raw_punches.len(),
            identity_collisions: index.collisions(),
            ..IngestStats::default()
        };
        let mut by_employee: HashMap<String, Vec<PunchLog>> = HashMap::new();

        for raw in raw_punches {
            let Some(resolution) = index.resolve(&raw.identifier_raw) else {
                debug!(identifier = %raw.identifier_raw, "Unresolved punch identifier");
                stats.unresolved += 1;
                continue;
            };
            if PunchState::from_label(&raw.state).is_none() {
                debug!(identifier = %raw.identifier_raw, state = %raw.state, "Unknown punch state");
                stats.unknown_state += 1;
                continue;
            }
            match raw.normalize(offset) {
                Ok(punch) => {
                    stats.accepted += 1;
                    by_employee.entry(resolution.employee_id).or_default().push(punch);
                }
                Err(err) => {
                    warn!(error = %err, "Dropping malformed punch");
                    stats.malformed += 1;
                }
            }
        }

        let days = by_employee
            .into_iter()
            .map(|(employee_id, punches)| {
                let summaries = aggregate_by_day(&employee_id, &punches);
                (employee_id, summaries)
            })
            .collect();

        info!(
            total = stats.total,
            accepted = stats.accepted,
            unresolved = stats.unresolved,
            malformed = stats.malformed,
            unknown_state = stats.unknown_state,
            "Ingested punch logs"
        );

        Self {
            employees: roster.iter().map(|e| (e.emp_id.clone(), e.clone())).collect(),
            days,
            office: settings.attendance.clone(),
            stats,
        }
    }

    /// Counts from ingestion.
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// The summary for an employee and date, if any punch fell on it.
    pub fn get_daily_attendance_summary(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Option<&DailyAttendanceSummary> {
        self.days.get(employee_id)?.get(&date)
    }

    /// Builds an employee's DTR for a cut-off.
    ///
    /// Returns [`EngineError::EmployeeNotFound`] for ids missing from the
    /// roster and [`EngineError::InvalidPeriod`] when the cut-off has no
    /// valid range.
    pub fn daily_time_record(
        &self,
        employee_id: &str,
        cutoff: &CutOffRecord,
        calendars: &Calendars,
    ) -> EngineResult<DailyTimeRecord> {
        let employee = self
            .employees
            .get(employee_id)
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;
        let range = resolve_cutoff_range(cutoff).ok_or_else(|| EngineError::InvalidPeriod {
            name: cutoff.name.clone(),
            message: "period dates are missing or inverted".to_string(),
        })?;

        let rows: Vec<DtrRow> = range
            .days()
            .map(|date| {
                let classification = classify_day_for(date, calendars, Some(employee_id));
                let summary = self.get_daily_attendance_summary(employee_id, date).cloned();
                DtrRow::new(classification, summary, &self.office)
            })
            .collect();
        let totals = DtrTotals::from_rows(&rows);

        Ok(DailyTimeRecord {
            employee_id: employee.emp_id.clone(),
            employee_name: employee.name.clone(),
            cutoff_name: cutoff.name.clone(),
            range,
            rows,
            totals,
        })
    }

    /// Builds DTRs for many employees; failures stay in their own slot.
    pub fn daily_time_records_batch(
        &self,
        employee_ids: &[String],
        cutoff: &CutOffRecord,
        calendars: &Calendars,
    ) -> Vec<EngineResult<DailyTimeRecord>> {
        run_isolated(employee_ids, |employee_id| {
            self.daily_time_record(employee_id, cutoff, calendars)
        })
    }
}

/// One line of a DTR sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtrRow {
    /// Date of the row.
    pub date: NaiveDate,
    /// What kind of day it was.
    pub classification: DayClassification,
    /// Punch summary, when the employee punched that day.
    pub summary: Option<DailyAttendanceSummary>,
    /// Minutes after office start, on workdays.
    pub tardy_minutes: i64,
    /// Minutes before office end, on workdays.
    pub undertime_minutes: i64,
    /// Workday without any punch.
    pub absent: bool,
}

impl DtrRow {
    fn new(
        classification: DayClassification,
        summary: Option<DailyAttendanceSummary>,
        office: &AttendanceSettings,
    ) -> Self {
        let workday = classification.kind.is_workday();
        let minutes_between = |earlier: NaiveTime, later: NaiveTime| (later - earlier).num_minutes().max(0);
        let (tardy_minutes, undertime_minutes) = match (&summary, workday) {
            (Some(s), true) => (
                s.time_in
                    .map(|time_in| minutes_between(office.office_start, time_in))
                    .unwrap_or(0),
                s.time_out
                    .map(|time_out| minutes_between(time_out, office.office_end))
                    .unwrap_or(0),
            ),
            _ => (0, 0),
        };

        Self {
            date: classification.date,
            absent: workday && summary.is_none(),
            classification,
            summary,
            tardy_minutes,
            undertime_minutes,
        }
    }
}

/// Totals printed at the foot of a DTR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtrTotals {
    /// Days with at least one punch.
    pub days_present: u32,
    /// Workdays without punches.
    pub absences: u32,
    /// Sum of tardy minutes.
    pub tardy_minutes: i64,
    /// Sum of undertime minutes.
    pub undertime_minutes: i64,
}

impl DtrTotals {
    fn from_rows(rows: &[DtrRow]) -> Self {
        rows.iter().fold(DtrTotals::default(), |mut totals, row| {
            if row.summary.is_some() {
                totals.days_present += 1;
            }
            if row.absent {
                totals.absences += 1;
            }
            totals.tardy_minutes += row.tardy_minutes;
            totals.undertime_minutes += row.undertime_minutes;
            totals
        })
    }
}

/// An employee's daily time record for one cut-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTimeRecord {
    /// Canonical employee id.
    pub employee_id: String,
    /// Name as on the roster.
    pub employee_name: String,
    /// Cut-off record name.
    pub cutoff_name: String,
    /// Dates covered.
    pub range: DateRange,
    /// One row per date.
    pub rows: Vec<DtrRow>,
    /// Totals over the rows.
    pub totals: DtrTotals,
}
