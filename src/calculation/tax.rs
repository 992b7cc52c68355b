//! Withholding tax.
//!
//! Regular employees' tax is entered by payroll staff and never recomputed.
//! Contract-of-Service tax is a flat rate on the cut-off's base pay net of
//! other deductions.

use rust_decimal::Decimal;

use super::earnings::round_money;
use crate::models::{AuditStep, EmployeeType};

/// The result of a tax calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct TaxResult {
    /// Tax for the cut-off.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates tax for one cut-off.
///
/// # Arguments
///
/// * `employee_type` - Selects the rule
/// * `base_pay` - The cut-off's gross earnings
/// * `other_deductions` - Sum of non-tax deductions for the cut-off
/// * `manual_tax` - Entered tax amount, if a tax line exists
/// * `cos_rate` - Flat rate for COS employees
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use dtr_payroll::calculation::calculate_tax;
/// use dtr_payroll::models::EmployeeType;
/// use rust_decimal::Decimal;
///
/// let rate = Decimal::new(3, 2);
///
/// // COS: (10000 - 1000) x 0.03
/// let cos = calculate_tax(
///     EmployeeType::ContractOfService,
///     Decimal::new(10000, 0),
///     Decimal::new(1000, 0),
///     None,
///     rate,
///     1,
/// );
/// assert_eq!(cos.amount, Decimal::new(270, 0));
///
/// // Regular: the manual amount, untouched
/// let regular = calculate_tax(
///     EmployeeType::Regular,
///     Decimal::new(10000, 0),
///     Decimal::new(1000, 0),
///     Some(Decimal::new(123456, 2)),
///     rate,
///     1,
/// );
/// assert_eq!(regular.amount, Decimal::new(123456, 2));
/// ```
pub fn calculate_tax(
    employee_type: EmployeeType,
    base_pay: Decimal,
    other_deductions: Decimal,
    manual_tax: Option<Decimal>,
    cos_rate: Decimal,
    step_number: u32,
) -> TaxResult {
    match employee_type {
        EmployeeType::Regular => {
            let amount = manual_tax.unwrap_or(Decimal::ZERO);
            TaxResult {
                amount,
                audit_step: AuditStep {
                    step_number,
                    rule_id: "tax_regular_manual".to_string(),
                    rule_name: "Withholding Tax (Regular)".to_string(),
                    input: serde_json::json!({
                        "manual_tax": manual_tax.map(|t| t.to_string())
                    }),
                    output: serde_json::json!({
                        "tax": amount.to_string()
                    }),
                    reasoning: match manual_tax {
                        Some(_) => format!("Manual tax of {amount} kept as entered"),
                        None => "No tax line entered, tax is 0".to_string(),
                    },
                },
            }
        }
        EmployeeType::ContractOfService => {
            let taxable = base_pay.saturating_sub(other_deductions).max(Decimal::ZERO);
            let amount = round_money(taxable.saturating_mul(cos_rate));
            TaxResult {
                amount,
                audit_step: AuditStep {
                    step_number,
                    rule_id: "tax_cos_flat_rate".to_string(),
                    rule_name: "Withholding Tax (Contract of Service)".to_string(),
                    input: serde_json::json!({
                        "base_pay": base_pay.to_string(),
                        "other_deductions": other_deductions.to_string(),
                        "rate": cos_rate.normalize().to_string()
                    }),
                    output: serde_json::json!({
                        "taxable": taxable.to_string(),
                        "tax": amount.to_string()
                    }),
                    reasoning: format!(
                        "max(0, {} - {}) x {} = {}",
                        base_pay,
                        other_deductions,
                        cos_rate.normalize(),
                        amount
                    ),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cos_tax(base: &str, other: &str) -> Decimal {
        calculate_tax(EmployeeType::ContractOfService, dec(base), dec(other), None, dec("0.03"), 1).amount
    }

    #[test]
    fn test_cos_tax_without_deductions() {
        assert_eq!(cos_tax("10000", "0"), dec("300"));
    }

    #[test]
    fn test_cos_tax_rounds_to_centavos() {
        // 8333.33 x 0.03 = 249.9999
        assert_eq!(cos_tax("8333.33", "0"), dec("250.00"));
    }

    #[test]
    fn test_cos_negative_base_clamps_to_zero() {
        assert_eq!(cos_tax("1000", "2500"), Decimal::ZERO);
    }

    #[test]
    fn test_cos_ignores_manual_tax() {
        let result = calculate_tax(
            EmployeeType::ContractOfService,
            dec("10000"),
            dec("0"),
            Some(dec("999")),
            dec("0.03"),
            1,
        );
        assert_eq!(result.amount, dec("300"));
        assert_eq!(result.audit_step.rule_id, "tax_cos_flat_rate");
    }

    #[test]
    fn test_regular_without_tax_line_is_zero() {
        let result = calculate_tax(EmployeeType::Regular, dec("10000"), dec("0"), None, dec("0.03"), 4);
        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(result.audit_step.step_number, 4);
    }

    proptest! {
        #[test]
        fn prop_regular_tax_never_changes(
            manual in 0i64..10_000_000,
            base in 0i64..10_000_000,
            other in 0i64..10_000_000,
        ) {
            let manual = Decimal::new(manual, 2);
            let result = calculate_tax(
                EmployeeType::Regular,
                Decimal::new(base, 2),
                Decimal::new(other, 2),
                Some(manual),
                dec("0.03"),
                1,
            );
            prop_assert_eq!(result.amount, manual);
        }

        #[test]
        fn prop_cos_tax_is_idempotent_and_non_negative(base in 0i64..10_000_000, other in 0i64..10_000_000) {
            let base = Decimal::new(base, 2).to_string();
            let other = Decimal::new(other, 2).to_string();
            let first = cos_tax(&base, &other);
            prop_assert_eq!(first, cos_tax(&base, &other));
            prop_assert!(first >= Decimal::ZERO);
        }
    }
}
