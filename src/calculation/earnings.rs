//! Gross earnings for a pay period.
//!
//! This module computes what an employee earns over a date range from the
//! monthly rate alone. Attendance does not enter here; absences and
//! tardiness are charged as deductions.

use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{AuditStep, AuditWarning, DateRange, days_in_month};

/// Rounds a money amount to centavos, halves away from zero.
///
/// ```
/// use dtr_payroll::calculation::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(10005, 3)), Decimal::new(1001, 2));
/// assert_eq!(round_money(Decimal::new(-10005, 3)), Decimal::new(-1001, 2));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums money amounts, clamping at the `Decimal` bounds instead of panicking.
pub fn sum_money<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// How the period was priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodShape {
    /// Exactly one calendar month.
    FullMonth,
    /// Starts on the 1st or the 16th: half the monthly rate.
    StandardHalf,
    /// Any other range, prorated by calendar days.
    Prorated,
}

/// The result of an earnings calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct EarningsResult {
    /// Gross amount earned, rounded to centavos.
    pub amount: Decimal,
    /// Which rule priced the period.
    pub shape: PeriodShape,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Set when the rate was too large to prorate exactly.
    pub warning: Option<AuditWarning>,
}

/// Calculates gross earnings for a date range.
///
/// - a full calendar month earns the monthly rate
/// - a range starting on the 1st earns half of it, rounded; one starting on
///   the 16th earns the rest, so the two halves always add up to the month
/// - anything else earns `monthly × days / days_in_month(start)`
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dtr_payroll::calculation::{calculate_earnings, PeriodShape};
/// use dtr_payroll::models::DateRange;
/// use rust_decimal::Decimal;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
/// ).unwrap();
///
/// let result = calculate_earnings(Decimal::new(20000, 0), &range, 1);
/// assert_eq!(result.amount, Decimal::new(10000, 0));
/// assert_eq!(result.shape, PeriodShape::StandardHalf);
/// ```
pub fn calculate_earnings(monthly_rate: Decimal, range: &DateRange, step_number: u32) -> EarningsResult {
    let month_days = days_in_month(range.start);
    let days = range.num_days();

    let monthly = round_money(monthly_rate);
    let first_half = round_money(monthly_rate / Decimal::TWO);
    let mut warning = None;

    let (shape, amount, reasoning) = if range.is_full_month() {
        (
            PeriodShape::FullMonth,
            monthly,
            format!("Full month: {} earned in full", monthly_rate.normalize()),
        )
    } else if range.start.day() == 1 {
        (
            PeriodShape::StandardHalf,
            first_half,
            format!("First half: {} / 2", monthly_rate.normalize()),
        )
    } else if range.start.day() == 16 {
        (
            PeriodShape::StandardHalf,
            monthly - first_half,
            format!("Second half: {} - {}", monthly, first_half),
        )
    } else {
        let amount = match prorate(monthly_rate, days, month_days) {
            Some(amount) => amount,
            None => {
                warn!(monthly_rate = %monthly_rate, days, "Prorated earnings overflow, dividing first");
                warning = Some(AuditWarning {
                    code: "earnings_overflow".to_string(),
                    message: format!("Monthly rate {monthly_rate} is too large to prorate exactly"),
                });
                (monthly_rate / Decimal::from(month_days))
                    .checked_mul(Decimal::from(days))
                    .map(round_money)
                    .unwrap_or(Decimal::ZERO)
            }
        };
        (
            PeriodShape::Prorated,
            amount,
            format!(
                "Prorated: {} x {} / {} days",
                monthly_rate.normalize(),
                days,
                month_days
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "gross_earnings".to_string(),
        rule_name: "Gross Earnings".to_string(),
        input: serde_json::json!({
            "monthly_rate": monthly_rate.normalize().to_string(),
            "period_start": range.start,
            "period_end": range.end,
            "days": days,
            "days_in_month": month_days
        }),
        output: serde_json::json!({
            "shape": shape,
            "amount": amount.to_string()
        }),
        reasoning: format!("{reasoning} = {amount}"),
    };

    EarningsResult {
        amount,
        shape,
        audit_step,
        warning,
    }
}

fn prorate(monthly_rate: Decimal, days: i64, month_days: u32) -> Option<Decimal> {
    monthly_rate
        .checked_mul(Decimal::from(days))?
        .checked_div(Decimal::from(month_days))
        .map(round_money)
}
