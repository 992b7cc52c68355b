//! Calculation logic for the DTR and payroll engine.
//!
//! This module contains the attendance side of the engine (identity
//! resolution, punch aggregation and day classification) and the payroll
//! side (cut-off resolution, earnings, deduction/incentive evaluation, tax
//! and payslip aggregation), plus batch evaluation across employees.

mod batch;
mod cutoff_days;
mod day_classification;
mod deductions;
mod earnings;
mod identity;
mod payslip;
mod punch_aggregation;
mod tax;

pub use batch::{PayslipJob, compute_payslips_batch, run_isolated};
pub use cutoff_days::{resolve_cutoff_days, resolve_cutoff_range};
pub use day_classification::{
    DayClassification, DayKind, classify_day, classify_day_for, is_excluded_national_holiday,
};
pub use deductions::{COS_CALCULATIONS, EvaluatedItems, RateBasis, evaluate_amount, evaluate_items};
pub use earnings::{EarningsResult, PeriodShape, calculate_earnings, round_money, sum_money};
pub use identity::{
    IdentityIndex, MatchRule, Resolution, digit_key, match_digits, match_exact, match_name,
    normalize_name,
};
pub use payslip::{PERA_ACA_TYPE_ID, PayslipInput, PeraAcaSelection, compute_payslip};
pub use punch_aggregation::{aggregate_by_day, aggregate_day, default_break_in, default_break_out};
pub use tax::{TaxResult, calculate_tax};
