//! Deduction and incentive evaluation.
//!
//! This module turns the line items entered for a cut-off into evaluated
//! amounts. Evaluation runs in four stages:
//!
//! 1. look up each item's catalog type and drop inapplicable ones
//! 2. compute the amount from the type's [`Calculation`]
//! 3. insert zero placeholders so COS payslips always show Tax, Absent and
//!    Late/Undertime lines
//! 4. partition into incentives, ordinary deductions and tax lines
//!
//! The tax amount itself is decided by [`calculate_tax`](super::calculate_tax)
//! and merged back with [`EvaluatedItems::merge_tax`].

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::earnings::{round_money, sum_money};
use crate::config::PayrollSettings;
use crate::models::{
    AuditStep, AuditWarning, Calculation, CutOffBucket, DeductionCatalog, DeductionKind,
    DeductionLineItem, DeductionType, Employee, EmployeeType, EvaluatedLine, LateUndertime,
    TimeUnit,
};

/// The only calculations a Contract-of-Service employee may carry.
pub const COS_CALCULATIONS: [Calculation; 3] =
    [Calculation::Tax, Calculation::Absent, Calculation::LateUndertime];

/// Rates an item's amount can be derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBasis {
    /// Monthly rate.
    pub monthly_rate: Decimal,
    /// Daily rate.
    pub daily_rate: Decimal,
    /// Hours in a working day.
    pub work_hours_per_day: u32,
}

impl RateBasis {
    /// Derives the rates for an employee.
    pub fn for_employee(employee: &Employee, settings: &PayrollSettings) -> Self {
        Self {
            monthly_rate: employee.monthly_rate(),
            daily_rate: employee.daily_rate(settings.working_days_per_month),
            work_hours_per_day: settings.work_hours_per_day,
        }
    }

    fn late_undertime_amount(&self, entry: &LateUndertime) -> Option<Decimal> {
        if self.work_hours_per_day == 0 {
            return Some(Decimal::ZERO);
        }
        let hours = Decimal::from(self.work_hours_per_day);
        // Multiply first so minute rates stay exact.
        let cost = entry.value.checked_mul(self.daily_rate)?;
        match entry.unit {
            TimeUnit::Hours => cost.checked_div(hours),
            TimeUnit::Minutes => cost.checked_div(hours * Decimal::from(60)),
        }
    }
}

/// Computes one line item's amount under a calculation.
///
/// Returns `None` when the amount overflows `Decimal`.
///
/// # Examples
///
/// ```
/// use dtr_payroll::calculation::{evaluate_amount, RateBasis};
/// use dtr_payroll::models::{Calculation, CutOffBucket, DeductionLineItem, LateUndertime, TimeUnit};
/// use rust_decimal::Decimal;
///
/// let basis = RateBasis {
///     monthly_rate: Decimal::new(17600, 0),
///     daily_rate: Decimal::new(800, 0),
///     work_hours_per_day: 8,
/// };
/// let item = DeductionLineItem {
///     type_id: "late_undertime".to_string(),
///     cutoff: CutOffBucket::First,
///     amount: Decimal::ZERO,
///     days: None,
///     late_undertime: Some(LateUndertime { value: Decimal::new(30, 0), unit: TimeUnit::Minutes }),
/// };
///
/// assert_eq!(
///     evaluate_amount(Calculation::LateUndertime, &item, &basis),
///     Some(Decimal::new(50, 0))
/// );
/// ```
pub fn evaluate_amount(
    calculation: Calculation,
    item: &DeductionLineItem,
    basis: &RateBasis,
) -> Option<Decimal> {
    let raw = match calculation {
        Calculation::Fixed | Calculation::Tax => Some(item.amount),
        Calculation::MonthlyRateMultiple { factor } => basis.monthly_rate.checked_mul(factor),
        Calculation::Absent => item.days.unwrap_or(Decimal::ZERO).checked_mul(basis.daily_rate),
        Calculation::LateUndertime => match &item.late_undertime {
            Some(entry) => basis.late_undertime_amount(entry),
            None => Some(Decimal::ZERO),
        },
    };
    raw.map(round_money)
}

/// Line items evaluated for one cut-off, before tax is decided.
#[derive(Debug, Clone)]
pub struct EvaluatedItems {
    /// Deductions other than tax.
    pub deductions: Vec<EvaluatedLine>,
    /// Tax lines as entered (manual amounts) or inserted as placeholders.
    pub tax_lines: Vec<EvaluatedLine>,
    /// Incentives.
    pub incentives: Vec<EvaluatedLine>,
    /// Sum of `deductions`; the "other deductions" fed to the tax calculator.
    pub subtotal: Decimal,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
    /// Skipped items and similar conditions.
    pub warnings: Vec<AuditWarning>,
}

impl EvaluatedItems {
    /// Sum of manually entered tax, or `None` when no tax line exists.
    pub fn manual_tax(&self) -> Option<Decimal> {
        if self.tax_lines.is_empty() {
            None
        } else {
            Some(sum_money(self.tax_lines.iter().map(|l| l.amount)))
        }
    }

    /// Sum of incentives.
    pub fn incentive_total(&self) -> Decimal {
        sum_money(self.incentives.iter().map(|l| l.amount))
    }

    /// Adds an incentive that did not come from a line item.
    pub fn push_incentive(&mut self, line: EvaluatedLine) {
        self.incentives.push(line);
    }

    /// Merges the decided tax back into the deductions.
    ///
    /// COS tax is collapsed into the first tax line carrying the computed
    /// amount. Regular tax lines keep their manual amounts untouched.
    /// Returns `(deductions, incentives)`, tax lines last.
    pub fn merge_tax(
        self,
        employee_type: EmployeeType,
        tax: Decimal,
    ) -> (Vec<EvaluatedLine>, Vec<EvaluatedLine>) {
        let mut deductions = self.deductions;
        match employee_type {
            EmployeeType::ContractOfService => {
                if let Some(mut line) = self.tax_lines.into_iter().next() {
                    line.amount = tax;
                    deductions.push(line);
                }
            }
            EmployeeType::Regular => deductions.extend(self.tax_lines),
        }
        (deductions, self.incentives)
    }
}

/// Evaluates the line items of one cut-off for an employee.
///
/// `bucket` is the cut-off the evaluation belongs to; placeholder lines
/// are stamped with it. Items are not filtered by their own bucket here.
pub fn evaluate_items<'a, I>(
    employee: &Employee,
    items: I,
    catalog: &DeductionCatalog,
    settings: &PayrollSettings,
    bucket: CutOffBucket,
    step_number: u32,
) -> EvaluatedItems
where
    I: IntoIterator<Item = &'a DeductionLineItem>,
{
    let basis = RateBasis::for_employee(employee, settings);
    let is_cos = employee.is_contract_of_service();
    let mut warnings = Vec::new();
    let mut lines: Vec<EvaluatedLine> = Vec::new();
    let mut skipped = 0usize;

    for item in items {
        let Some(deduction_type) = catalog.get(&item.type_id) else {
            warn!(type_id = %item.type_id, employee_id = %employee.emp_id, "Skipping line item with unknown type");
            warnings.push(AuditWarning {
                code: "unknown_deduction_type".to_string(),
                message: format!("Line item references unknown type '{}'", item.type_id),
            });
            skipped += 1;
            continue;
        };

        if !is_applicable(deduction_type, employee.employee_type) {
            debug!(
                type_id = %deduction_type.id,
                employee_id = %employee.emp_id,
                "Skipping line item not applicable to employee type"
            );
            skipped += 1;
            continue;
        }

        let amount = match evaluate_amount(deduction_type.calculation, item, &basis) {
            Some(amount) => amount,
            None => {
                warn!(type_id = %deduction_type.id, employee_id = %employee.emp_id, "Line item amount overflows");
                warnings.push(AuditWarning {
                    code: "amount_overflow".to_string(),
                    message: format!("Amount for '{}' is too large and was set to 0", deduction_type.id),
                });
                Decimal::ZERO
            }
        };

        lines.push(EvaluatedLine {
            type_id: deduction_type.id.clone(),
            name: deduction_type.name.clone(),
            kind: deduction_type.kind,
            calculation: deduction_type.calculation,
            cutoff: item.cutoff,
            amount,
            placeholder: false,
        });
    }

    let mut placeholders = 0usize;
    if is_cos {
        for calculation in COS_CALCULATIONS {
            if lines.iter().any(|l| l.calculation == calculation) {
                continue;
            }
            lines.push(placeholder_line(catalog, calculation, bucket));
            placeholders += 1;
        }
    }

    let mut deductions = Vec::new();
    let mut tax_lines = Vec::new();
    let mut incentives = Vec::new();
    for line in lines {
        if line.is_tax() {
            tax_lines.push(line);
        } else if line.kind == DeductionKind::Incentive {
            incentives.push(line);
        } else {
            deductions.push(line);
        }
    }
    let subtotal = sum_money(deductions.iter().map(|l| l.amount));

    let audit_step = AuditStep {
        step_number,
        rule_id: "deduction_evaluation".to_string(),
        rule_name: "Deduction/Incentive Evaluation".to_string(),
        input: serde_json::json!({
            "employee_type": employee.employee_type,
            "cutoff": bucket,
            "daily_rate": basis.daily_rate.normalize().to_string(),
            "skipped_items": skipped
        }),
        output: serde_json::json!({
            "deductions": line_summaries(&deductions),
            "tax_lines": line_summaries(&tax_lines),
            "incentives": line_summaries(&incentives),
            "placeholders": placeholders,
            "subtotal": subtotal.to_string()
        }),
        reasoning: format!(
            "{} deduction(s) totalling {}, {} incentive(s), {} tax line(s)",
            deductions.len(),
            subtotal,
            incentives.len(),
            tax_lines.len()
        ),
    };

    EvaluatedItems {
        deductions,
        tax_lines,
        incentives,
        subtotal,
        audit_step,
        warnings,
    }
}

fn is_applicable(deduction_type: &DeductionType, employee_type: EmployeeType) -> bool {
    if !deduction_type.applicable_to.covers(employee_type) {
        return false;
    }
    employee_type != EmployeeType::ContractOfService
        || COS_CALCULATIONS.contains(&deduction_type.calculation)
}

fn placeholder_line(
    catalog: &DeductionCatalog,
    calculation: Calculation,
    bucket: CutOffBucket,
) -> EvaluatedLine {
    let (type_id, name) = match catalog.first_with(calculation) {
        Some(t) => (t.id.clone(), t.name.clone()),
        None => match calculation {
            Calculation::Tax => ("tax".to_string(), "Withholding Tax".to_string()),
            Calculation::Absent => ("absent".to_string(), "Absences".to_string()),
            _ => ("late_undertime".to_string(), "Late/Undertime".to_string()),
        },
    };
    EvaluatedLine {
        type_id,
        name,
        kind: DeductionKind::Deduction,
        calculation,
        cutoff: bucket,
        amount: Decimal::ZERO,
        placeholder: true,
    }
}

fn line_summaries(lines: &[EvaluatedLine]) -> serde_json::Value {
    lines
        .iter()
        .map(|l| {
            serde_json::json!({
                "type_id": l.type_id,
                "amount": l.amount.to_string(),
                "placeholder": l.placeholder
            })
        })
        .collect()
}
