//! Request types for the DTR and payroll API.
//!
//! This module defines the JSON request structures for every endpoint.
//! The engine holds no roster or punch store, so each request carries the
//! snapshot it needs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::{PayslipInput, PeraAcaSelection};
use crate::models::{Calendars, CutOffRecord, DeductionLineItem, Employee, RawPunch};

/// Request body for the `/payslip` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipRequest {
    /// The employee being paid.
    pub employee: Employee,
    /// Selected cut-off; omitted or invalid yields a zero payslip.
    #[serde(default)]
    pub period: Option<CutOffRecord>,
    /// Deductions and incentives entered for the period.
    #[serde(default)]
    pub line_items: Vec<DeductionLineItem>,
    /// PERA/ACA allowance and its target cut-off.
    #[serde(default)]
    pub pera_aca: Option<PeraAcaSelection>,
}

impl PayslipRequest {
    /// Borrows the request as calculator input.
    pub fn as_input(&self) -> PayslipInput<'_> {
        PayslipInput {
            employee: &self.employee,
            period: self.period.as_ref(),
            line_items: &self.line_items,
            pera_aca: self.pera_aca,
        }
    }
}

/// Request body for the `/cutoff/days` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutOffDaysRequest {
    /// The stored cut-off record.
    pub cutoff: CutOffRecord,
}

/// Response body for the `/cutoff/days` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutOffDaysResponse {
    /// Days of the month covered.
    pub days: Vec<u32>,
}

/// Request body for the `/calendar/classify` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyDayRequest {
    /// Date to classify.
    pub date: NaiveDate,
    /// Restricts trainings to this employee's.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Local holidays, suspensions and trainings. National holidays are
    /// merged in from the server's holiday cache.
    #[serde(default)]
    pub calendars: Calendars,
}

/// Request body for the `/attendance/summary` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSummaryRequest {
    /// Roster snapshot used for identity resolution.
    pub roster: Vec<Employee>,
    /// Raw punch snapshot.
    pub punches: Vec<RawPunch>,
    /// Canonical employee id.
    pub employee_id: String,
    /// Date to summarize.
    pub date: NaiveDate,
}

/// Request body for the `/attendance/dtr` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTimeRecordRequest {
    /// Roster snapshot used for identity resolution.
    pub roster: Vec<Employee>,
    /// Raw punch snapshot.
    pub punches: Vec<RawPunch>,
    /// Canonical employee id.
    pub employee_id: String,
    /// Cut-off to build the DTR for.
    pub cutoff: CutOffRecord,
    /// Calendar overlays; national holidays come from the holiday cache.
    #[serde(default)]
    pub calendars: Calendars,
}
