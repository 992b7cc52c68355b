//! Payslip models.
//!
//! This module contains the [`Payslip`] type and the structures that make
//! up its per-cut-off breakdown and audit trace. A payslip carries no
//! timestamps or generated ids: computing it twice from the same inputs
//! yields an identical value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Calculation, CutOffBucket, DateRange, DeductionKind, EmployeeType};

/// One evaluated deduction or incentive.
///
/// # Example
///
/// ```
/// use dtr_payroll::models::{Calculation, CutOffBucket, DeductionKind, EvaluatedLine};
/// use rust_decimal::Decimal;
///
/// let line = EvaluatedLine {
///     type_id: "absent".to_string(),
///     name: "Absences".to_string(),
///     kind: DeductionKind::Deduction,
///     calculation: Calculation::Absent,
///     cutoff: CutOffBucket::First,
///     amount: Decimal::new(1000, 0),
///     placeholder: false,
/// };
/// assert!(!line.is_tax());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedLine {
    /// Catalog id.
    pub type_id: String,
    /// Catalog display name.
    pub name: String,
    /// Deduction or incentive.
    pub kind: DeductionKind,
    /// How the amount was produced.
    pub calculation: Calculation,
    /// Half of the month the line was entered for.
    pub cutoff: CutOffBucket,
    /// Final amount, rounded to centavos.
    pub amount: Decimal,
    /// True for zero lines inserted so COS totals stay well-defined.
    pub placeholder: bool,
}

impl EvaluatedLine {
    /// True if this is the withholding tax line.
    pub fn is_tax(&self) -> bool {
        self.calculation == Calculation::Tax
    }
}

/// Gross income block printed at the top of a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossIncome {
    /// The employee's monthly rate.
    pub monthly_rate: Decimal,
    /// Earnings for the selected period.
    pub gross_amount_earned: Decimal,
}

/// Money totals for a cut-off or a whole payslip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipTotals {
    /// Gross earnings for the period.
    pub earnings: Decimal,
    /// Sum of incentives.
    pub incentives: Decimal,
    /// Sum of deductions, tax included.
    pub deductions: Decimal,
    /// Withholding tax alone.
    pub tax: Decimal,
    /// earnings + incentives - deductions.
    pub net_pay: Decimal,
}

impl PayslipTotals {
    /// Adds two sets of totals field by field.
    pub fn combine(&self, other: &PayslipTotals) -> PayslipTotals {
        PayslipTotals {
            earnings: self.earnings.saturating_add(other.earnings),
            incentives: self.incentives.saturating_add(other.incentives),
            deductions: self.deductions.saturating_add(other.deductions),
            tax: self.tax.saturating_add(other.tax),
            net_pay: self.net_pay.saturating_add(other.net_pay),
        }
    }
}

/// Everything computed for one cut-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutOffBreakdown {
    /// Which half this breakdown covers.
    pub bucket: CutOffBucket,
    /// Dates covered.
    pub range: DateRange,
    /// Deductions, tax line included.
    pub deductions: Vec<EvaluatedLine>,
    /// Incentives, PERA/ACA included when targeted here.
    pub incentives: Vec<EvaluatedLine>,
    /// Totals for this cut-off.
    pub totals: PayslipTotals,
}

/// The period shape a payslip was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PayslipPeriod {
    /// No valid range selected; all totals are zero.
    NoPeriod,
    /// A single cut-off (half month or custom range).
    SingleCutOff {
        /// The cut-off's breakdown.
        cutoff: CutOffBreakdown,
    },
    /// A full calendar month, split into its two halves.
    FullMonthSplit {
        /// The whole month.
        month: DateRange,
        /// Days 1-15.
        first_half: CutOffBreakdown,
        /// Days 16-end.
        second_half: CutOffBreakdown,
    },
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

/// The complete audit trace for a payslip computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Number to give the next recorded step.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }
}

/// The complete result of a payslip computation.
///
/// Issuing (persisting) a payslip is owned by an outer layer; this value is
/// the side-effect-free preview it persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Canonical employee id.
    pub employee_id: String,
    /// Classification the rules were applied for.
    pub employee_type: EmployeeType,
    /// Version of the engine that produced the payslip.
    pub engine_version: String,
    /// Gross income block.
    pub gross_income: GrossIncome,
    /// Period shape and per-cut-off breakdowns.
    pub period: PayslipPeriod,
    /// Grand totals over every cut-off.
    pub totals: PayslipTotals,
    /// Every decision made along the way.
    pub audit_trace: AuditTrace,
}

impl Payslip {
    /// Breakdowns in calendar order; empty for [`PayslipPeriod::NoPeriod`].
    pub fn cutoffs(&self) -> Vec<&CutOffBreakdown> {
        match &self.period {
            PayslipPeriod::NoPeriod => vec![],
            PayslipPeriod::SingleCutOff { cutoff } => vec![cutoff],
            PayslipPeriod::FullMonthSplit {
                first_half,
                second_half,
                ..
            } => vec![first_half, second_half],
        }
    }
}
