//! Core data models for the DTR and payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod calendar;
mod deduction;
mod employee;
mod payslip;
mod period;
mod punch;

pub use attendance::{DailyAttendanceSummary, format_dtr_time};
pub use calendar::{
    Calendars, LocalHoliday, NationalHoliday, Suspension, Training, TrainingParticipant,
};
pub use deduction::{
    ApplicableTo, Calculation, CalculationMode, DeductionCatalog, DeductionKind,
    DeductionLineItem, DeductionType, DeductionTypeRecord, LateUndertime, TimeUnit,
};
pub use employee::{Employee, EmployeeType, SalaryInfo};
pub use payslip::{
    AuditStep, AuditTrace, AuditWarning, CutOffBreakdown, EvaluatedLine, GrossIncome, Payslip,
    PayslipPeriod, PayslipTotals,
};
pub use period::{CutOffBucket, CutOffRecord, DateRange, days_in_month, last_day_of_month};
pub use punch::{PunchLog, PunchState, RawPunch, parse_punch_timestamp};
