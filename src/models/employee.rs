//! Employee model and related types.
//!
//! This module defines the [`Employee`] roster record and the
//! [`EmployeeType`] classification that drives tax and deduction rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The employee classification used by payroll rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeType {
    /// Plantilla (regular) employee. Tax is entered manually.
    Regular,
    /// Contract-of-Service (COS) employee. Tax is computed, and only
    /// Tax/Absent/Late-Undertime line items apply.
    ContractOfService,
}

/// Salary figures carried on the roster record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryInfo {
    /// The monthly rate. All earnings derive from this figure.
    pub rate_per_month: Decimal,
    /// Explicit daily rate, when the roster provides one.
    #[serde(default)]
    pub daily_rate: Option<Decimal>,
    /// Basic salary as recorded by HR (informational).
    #[serde(default)]
    pub basic_salary: Option<Decimal>,
}

/// An employee on the roster. The roster is read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Canonical employee id.
    pub emp_id: String,
    /// Employee number as printed on HR documents.
    #[serde(default)]
    pub emp_no: Option<String>,
    /// Biometric device account number.
    #[serde(default)]
    pub ac_no: Option<String>,
    /// Other ids this employee has been known by.
    #[serde(default)]
    pub alternate_emp_ids: Vec<String>,
    /// Display name, often in `Last, First Middle` form.
    pub name: String,
    /// Pre-normalized name, if HR maintains one.
    #[serde(default)]
    pub normalized_name: Option<String>,
    /// Payroll classification.
    pub employee_type: EmployeeType,
    /// Division name.
    #[serde(default)]
    pub division: Option<String>,
    /// Section or unit name.
    #[serde(default)]
    pub section_or_unit: Option<String>,
    /// Position title.
    #[serde(default)]
    pub position: Option<String>,
    /// Salary figures.
    pub salary_info: SalaryInfo,
}

impl Employee {
    /// Returns true if the employee is on a Contract of Service.
    ///
    /// # Examples
    ///
    /// ```
    /// use dtr_payroll::models::{Employee, EmployeeType, SalaryInfo};
    /// use rust_decimal::Decimal;
    ///
    /// let cos = Employee {
    ///     emp_id: "EMP-001".to_string(),
    ///     emp_no: None,
    ///     ac_no: Some("0012".to_string()),
    ///     alternate_emp_ids: vec![],
    ///     name: "Dela Cruz, Juan".to_string(),
    ///     normalized_name: None,
    ///     employee_type: EmployeeType::ContractOfService,
    ///     division: None,
    ///     section_or_unit: None,
    ///     position: None,
    ///     salary_info: SalaryInfo {
    ///         rate_per_month: Decimal::new(20000, 0),
    ///         daily_rate: None,
    ///         basic_salary: None,
    ///     },
    /// };
    /// assert!(cos.is_contract_of_service());
    /// ```
    pub fn is_contract_of_service(&self) -> bool {
        self.employee_type == EmployeeType::ContractOfService
    }

    /// Returns the monthly rate.
    pub fn monthly_rate(&self) -> Decimal {
        self.salary_info.rate_per_month
    }

    /// Returns the daily rate, falling back to `monthly / working_days_per_month`
    /// when the roster carries none.
    pub fn daily_rate(&self, working_days_per_month: u32) -> Decimal {
        match self.salary_info.daily_rate {
            Some(rate) => rate,
            None if working_days_per_month == 0 => Decimal::ZERO,
            None => self.salary_info.rate_per_month / Decimal::from(working_days_per_month),
        }
    }
}
