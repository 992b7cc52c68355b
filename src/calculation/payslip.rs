//! Payslip aggregation.
//!
//! This module ties the calculators together. A selected cut-off resolves
//! to one of three shapes:
//!
//! - no valid range: a zero payslip
//! - a full calendar month: split into halves, each priced, taxed and
//!   totalled on its own
//! - anything else: a single cut-off

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cutoff_days::resolve_cutoff_range;
use super::deductions::evaluate_items;
use super::earnings::{calculate_earnings, round_money, sum_money};
use super::tax::calculate_tax;
use crate::config::PayrollSettings;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, Calculation, CutOffBreakdown, CutOffBucket, CutOffRecord,
    DateRange, DeductionCatalog, DeductionKind, DeductionLineItem, Employee, EvaluatedLine,
    GrossIncome, Payslip, PayslipPeriod, PayslipTotals,
};

/// Catalog id of the PERA/ACA allowance.
///
/// PERA/ACA is paid only through [`PeraAcaSelection`]; line items with this
/// type are ignored.
pub const PERA_ACA_TYPE_ID: &str = "pera_aca";

/// The PERA/ACA allowance and the cut-off it is paid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeraAcaSelection {
    /// Allowance amount.
    pub amount: Decimal,
    /// Cut-off that receives the allowance.
    pub target: CutOffBucket,
}

/// Everything a payslip is computed from.
#[derive(Debug, Clone, Copy)]
pub struct PayslipInput<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// Selected cut-off, if any.
    pub period: Option<&'a CutOffRecord>,
    /// Deductions and incentives entered for the period.
    pub line_items: &'a [DeductionLineItem],
    /// PERA/ACA allowance, if granted.
    pub pera_aca: Option<PeraAcaSelection>,
}

/// Computes a payslip.
///
/// The result depends only on the arguments: computing twice yields equal
/// payslips.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use dtr_payroll::calculation::{compute_payslip, PayslipInput};
/// use dtr_payroll::config::PayrollSettings;
/// use dtr_payroll::models::{
///     CutOffRecord, DeductionCatalog, Employee, EmployeeType, PayslipPeriod, SalaryInfo,
/// };
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     emp_id: "EMP-001".to_string(),
///     emp_no: None,
///     ac_no: None,
///     alternate_emp_ids: vec![],
///     name: "Santos, Maria".to_string(),
///     normalized_name: None,
///     employee_type: EmployeeType::Regular,
///     division: None,
///     section_or_unit: None,
///     position: None,
///     salary_info: SalaryInfo {
///         rate_per_month: Decimal::new(20000, 0),
///         daily_rate: None,
///         basic_salary: None,
///     },
/// };
/// let march = CutOffRecord {
///     name: "March 2025".to_string(),
///     period_start: NaiveDate::from_ymd_opt(2025, 3, 1),
///     period_end: NaiveDate::from_ymd_opt(2025, 3, 31),
/// };
///
/// let input = PayslipInput {
///     employee: &employee,
///     period: Some(&march),
///     line_items: &[],
///     pera_aca: None,
/// };
/// let payslip = compute_payslip(&input, &DeductionCatalog::default(), &PayrollSettings::default());
///
/// assert!(matches!(payslip.period, PayslipPeriod::FullMonthSplit { .. }));
/// assert_eq!(payslip.totals.earnings, Decimal::new(20000, 0));
/// ```
pub fn compute_payslip(
    input: &PayslipInput<'_>,
    catalog: &DeductionCatalog,
    settings: &PayrollSettings,
) -> Payslip {
    let employee = input.employee;
    let mut trace = AuditTrace::default();

    let range = input.period.and_then(resolve_cutoff_range);
    trace.steps.push(period_step(input.period, range, trace.next_step_number()));

    let period = match range {
        None => {
            if let Some(record) = input.period {
                warn!(employee_id = %employee.emp_id, cutoff = %record.name, "Cut-off has no valid range");
            }
            trace.warnings.push(AuditWarning {
                code: "no_period".to_string(),
                message: "No valid cut-off range selected; all totals are zero".to_string(),
            });
            PayslipPeriod::NoPeriod
        }
        Some(month) if month.is_full_month() => {
            let first_range = DateRange::first_half_of(month.start);
            let second_range = DateRange::second_half_of(month.start);
            let first_half = compute_cutoff(
                input,
                catalog,
                settings,
                first_range,
                CutOffBucket::First,
                true,
                &mut trace,
            );
            let second_half = compute_cutoff(
                input,
                catalog,
                settings,
                second_range,
                CutOffBucket::Second,
                true,
                &mut trace,
            );
            PayslipPeriod::FullMonthSplit {
                month,
                first_half,
                second_half,
            }
        }
        Some(range) => {
            let bucket = CutOffBucket::for_start(range.start);
            let cutoff = compute_cutoff(input, catalog, settings, range, bucket, false, &mut trace);
            PayslipPeriod::SingleCutOff { cutoff }
        }
    };

    let totals = match &period {
        PayslipPeriod::NoPeriod => PayslipTotals::default(),
        PayslipPeriod::SingleCutOff { cutoff } => cutoff.totals.clone(),
        PayslipPeriod::FullMonthSplit {
            first_half,
            second_half,
            ..
        } => first_half.totals.combine(&second_half.totals),
    };

    debug!(
        employee_id = %employee.emp_id,
        net_pay = %totals.net_pay,
        steps = trace.steps.len(),
        "Computed payslip"
    );

    Payslip {
        employee_id: employee.emp_id.clone(),
        employee_type: employee.employee_type,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        gross_income: GrossIncome {
            monthly_rate: employee.monthly_rate(),
            gross_amount_earned: totals.earnings,
        },
        period,
        totals,
        audit_trace: trace,
    }
}

fn period_step(record: Option<&CutOffRecord>, range: Option<DateRange>, step_number: u32) -> AuditStep {
    let shape = match range {
        None => "no_period",
        Some(r) if r.is_full_month() => "full_month_split",
        Some(_) => "single_cut_off",
    };
    AuditStep {
        step_number,
        rule_id: "period_resolution".to_string(),
        rule_name: "Cut-Off Period Resolution".to_string(),
        input: serde_json::json!({
            "cutoff_name": record.map(|r| r.name.clone()),
            "period_start": record.and_then(|r| r.period_start),
            "period_end": record.and_then(|r| r.period_end)
        }),
        output: serde_json::json!({
            "shape": shape,
            "range": range
        }),
        reasoning: match range {
            Some(r) => format!("Resolved to {} - {} ({shape})", r.start, r.end),
            None => "No valid range could be resolved".to_string(),
        },
    }
}

/// Prices, evaluates and taxes one cut-off.
///
/// With `route_by_bucket`, only line items entered for `bucket` are used;
/// otherwise every item applies.
fn compute_cutoff(
    input: &PayslipInput<'_>,
    catalog: &DeductionCatalog,
    settings: &PayrollSettings,
    range: DateRange,
    bucket: CutOffBucket,
    route_by_bucket: bool,
    trace: &mut AuditTrace,
) -> CutOffBreakdown {
    let employee = input.employee;

    let earnings = calculate_earnings(employee.monthly_rate(), &range, trace.next_step_number());
    trace.steps.push(earnings.audit_step);
    trace.warnings.extend(earnings.warning);

    let mut items = Vec::with_capacity(input.line_items.len());
    for item in input.line_items {
        if route_by_bucket && item.cutoff != bucket {
            continue;
        }
        if item.type_id == PERA_ACA_TYPE_ID {
            warn!(employee_id = %employee.emp_id, "Ignoring PERA/ACA line item; use the PERA/ACA selection");
            trace.warnings.push(AuditWarning {
                code: "pera_aca_line_item_ignored".to_string(),
                message: "PERA/ACA is paid through the PERA/ACA selection, not line items".to_string(),
            });
            continue;
        }
        items.push(item);
    }
    let mut evaluated = evaluate_items(employee, items, catalog, settings, bucket, trace.next_step_number());
    trace.steps.push(evaluated.audit_step.clone());
    trace.warnings.append(&mut evaluated.warnings);

    if let Some(selection) = input.pera_aca.filter(|s| s.target == bucket) {
        match pera_aca_line(catalog, employee, selection) {
            Ok(line) => evaluated.push_incentive(line),
            Err(warning) => trace.warnings.push(warning),
        }
    }

    let tax = calculate_tax(
        employee.employee_type,
        earnings.amount,
        evaluated.subtotal,
        evaluated.manual_tax(),
        settings.cos_tax_rate,
        trace.next_step_number(),
    );
    trace.steps.push(tax.audit_step);

    let (deductions, incentives) = evaluated.merge_tax(employee.employee_type, tax.amount);
    let incentives_total = sum_money(incentives.iter().map(|l| l.amount));
    let deductions_total = sum_money(deductions.iter().map(|l| l.amount));
    let net_pay = earnings
        .amount
        .saturating_add(incentives_total)
        .saturating_sub(deductions_total);

    let totals = PayslipTotals {
        earnings: earnings.amount,
        incentives: incentives_total,
        deductions: deductions_total,
        tax: tax.amount,
        net_pay,
    };

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "cutoff": bucket,
            "earnings": totals.earnings.to_string(),
            "incentives": totals.incentives.to_string(),
            "deductions": totals.deductions.to_string()
        }),
        output: serde_json::json!({
            "net_pay": net_pay.to_string()
        }),
        reasoning: format!(
            "{} + {} - {} = {}",
            totals.earnings, totals.incentives, totals.deductions, net_pay
        ),
    });

    CutOffBreakdown {
        bucket,
        range,
        deductions,
        incentives,
        totals,
    }
}

fn pera_aca_line(
    catalog: &DeductionCatalog,
    employee: &Employee,
    selection: PeraAcaSelection,
) -> Result<EvaluatedLine, AuditWarning> {
    let configured = catalog.get(PERA_ACA_TYPE_ID);
    let applicable = !employee.is_contract_of_service()
        && configured.is_none_or(|t| t.applicable_to.covers(employee.employee_type));
    if !applicable {
        return Err(AuditWarning {
            code: "pera_aca_not_applicable".to_string(),
            message: format!("PERA/ACA does not apply to employee {}", employee.emp_id),
        });
    }

    Ok(EvaluatedLine {
        type_id: PERA_ACA_TYPE_ID.to_string(),
        name: configured
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "PERA/ACA".to_string()),
        kind: DeductionKind::Incentive,
        calculation: Calculation::Fixed,
        cutoff: selection.target,
        amount: round_money(selection.amount),
        placeholder: false,
    })
}
