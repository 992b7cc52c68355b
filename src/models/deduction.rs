//! Deduction/incentive catalog and line-item models.
//!
//! The catalog is authored on the payroll settings screen as loosely typed
//! records (`calculation_mode` plus an optional free-text `formula`). On the
//! way in, each record is folded into a closed [`Calculation`] variant so
//! the evaluator never string-matches expressions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CutOffBucket, EmployeeType};

/// Whether a line item reduces or increases net pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    /// Subtracted from net pay.
    Deduction,
    /// Added to net pay.
    Incentive,
}

/// Calculation mode as stored on the catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// Amount entered by hand.
    Fixed,
    /// Amount derived from the `formula` field.
    Formula,
    /// Days absent times the daily rate.
    #[serde(alias = "Absent")]
    Absent,
    /// Late/undertime hours or minutes times the hourly rate.
    #[serde(alias = "LateUndertime")]
    LateUndertime,
    /// Withholding tax.
    #[serde(alias = "Tax")]
    Tax,
}

/// Which employee classes a catalog entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicableTo {
    /// Every employee.
    #[default]
    Both,
    /// Regular employees only.
    Regular,
    /// Contract-of-Service employees only.
    ContractOfService,
}

impl ApplicableTo {
    /// Checks if an employee class is covered.
    pub fn covers(self, employee_type: EmployeeType) -> bool {
        match self {
            ApplicableTo::Both => true,
            ApplicableTo::Regular => employee_type == EmployeeType::Regular,
            ApplicableTo::ContractOfService => employee_type == EmployeeType::ContractOfService,
        }
    }
}

/// How a line item's amount is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Calculation {
    /// The entered amount, unchanged.
    Fixed,
    /// The monthly rate times a constant factor.
    MonthlyRateMultiple {
        /// Multiplier applied to the monthly rate.
        factor: Decimal,
    },
    /// Days absent times the daily rate.
    Absent,
    /// Late/undertime value times the hourly or per-minute rate.
    LateUndertime,
    /// Withholding tax; see the tax calculator.
    Tax,
}

impl Calculation {
    /// Folds a stored mode and formula into a calculation.
    ///
    /// Only `monthlyRate` and `monthlyRate * <n>` (either operand order,
    /// `*` or `×`) are understood. Anything else falls back to
    /// [`Calculation::Fixed`], which uses the entered amount.
    ///
    /// # Examples
    ///
    /// ```
    /// use dtr_payroll::models::{Calculation, CalculationMode};
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(
    ///     Calculation::from_mode(CalculationMode::Formula, Some("monthlyRate × 2")),
    ///     Calculation::MonthlyRateMultiple { factor: Decimal::new(2, 0) },
    /// );
    /// assert_eq!(
    ///     Calculation::from_mode(CalculationMode::Formula, Some("basic + cola")),
    ///     Calculation::Fixed,
    /// );
    /// ```
    pub fn from_mode(mode: CalculationMode, formula: Option<&str>) -> Self {
        match mode {
            CalculationMode::Fixed => Calculation::Fixed,
            CalculationMode::Absent => Calculation::Absent,
            CalculationMode::LateUndertime => Calculation::LateUndertime,
            CalculationMode::Tax => Calculation::Tax,
            CalculationMode::Formula => match formula.and_then(parse_monthly_rate_factor) {
                Some(factor) => Calculation::MonthlyRateMultiple { factor },
                None => {
                    warn!(formula = ?formula, "Unsupported formula, using entered amount");
                    Calculation::Fixed
                }
            },
        }
    }

    /// The stored mode and formula this calculation round-trips to.
    pub fn to_mode(self) -> (CalculationMode, Option<String>) {
        match self {
            Calculation::Fixed => (CalculationMode::Fixed, None),
            Calculation::MonthlyRateMultiple { factor } if factor == Decimal::ONE => {
                (CalculationMode::Formula, Some("monthlyRate".to_string()))
            }
            Calculation::MonthlyRateMultiple { factor } => (
                CalculationMode::Formula,
                Some(format!("monthlyRate * {}", factor.normalize())),
            ),
            Calculation::Absent => (CalculationMode::Absent, None),
            Calculation::LateUndertime => (CalculationMode::LateUndertime, None),
            Calculation::Tax => (CalculationMode::Tax, None),
        }
    }
}

const MONTHLY_RATE: &str = "monthlyrate";

fn parse_monthly_rate_factor(formula: &str) -> Option<Decimal> {
    let compact: String = formula
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    if compact == MONTHLY_RATE {
        return Some(Decimal::ONE);
    }

    let mut operands = compact.split(['*', '×']);
    let (lhs, rhs) = (operands.next()?, operands.next()?);
    if operands.next().is_some() {
        return None;
    }
    let factor = match (lhs, rhs) {
        (MONTHLY_RATE, n) | (n, MONTHLY_RATE) => n.parse::<Decimal>().ok()?,
        _ => return None,
    };
    (factor >= Decimal::ZERO).then_some(factor)
}

/// Catalog record as stored by the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionTypeRecord {
    /// Stable id referenced by line items.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Deduction or incentive.
    pub kind: DeductionKind,
    /// Stored calculation mode.
    pub calculation_mode: CalculationMode,
    /// Employee classes covered.
    #[serde(default)]
    pub applicable_to: ApplicableTo,
    /// Free-text formula, meaningful only for `formula` mode.
    #[serde(default)]
    pub formula: Option<String>,
}

/// A catalog entry with its calculation resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeductionTypeRecord", into = "DeductionTypeRecord")]
pub struct DeductionType {
    /// Stable id referenced by line items.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Deduction or incentive.
    pub kind: DeductionKind,
    /// Resolved calculation.
    pub calculation: Calculation,
    /// Employee classes covered.
    pub applicable_to: ApplicableTo,
}

impl From<DeductionTypeRecord> for DeductionType {
    fn from(record: DeductionTypeRecord) -> Self {
        let calculation = Calculation::from_mode(record.calculation_mode, record.formula.as_deref());
        DeductionType {
            id: record.id,
            name: record.name,
            kind: record.kind,
            calculation,
            applicable_to: record.applicable_to,
        }
    }
}

impl From<DeductionType> for DeductionTypeRecord {
    fn from(deduction_type: DeductionType) -> Self {
        let (calculation_mode, formula) = deduction_type.calculation.to_mode();
        DeductionTypeRecord {
            id: deduction_type.id,
            name: deduction_type.name,
            kind: deduction_type.kind,
            calculation_mode,
            applicable_to: deduction_type.applicable_to,
            formula,
        }
    }
}

/// The ordered deduction-type catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeductionCatalog {
    types: Vec<DeductionType>,
}

impl DeductionCatalog {
    /// Creates a catalog, keeping the given order.
    pub fn new(types: Vec<DeductionType>) -> Self {
        Self { types }
    }

    /// Looks up a type by id.
    pub fn get(&self, id: &str) -> Option<&DeductionType> {
        self.types.iter().find(|t| t.id == id)
    }

    /// All types in catalog order.
    pub fn types(&self) -> &[DeductionType] {
        &self.types
    }

    /// The first type using a given calculation.
    pub fn first_with(&self, calculation: Calculation) -> Option<&DeductionType> {
        self.types.iter().find(|t| t.calculation == calculation)
    }
}

/// Unit of a late/undertime entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Whole or fractional hours.
    Hours,
    /// Minutes.
    Minutes,
}

/// Late/undertime quantity entered on a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateUndertime {
    /// Quantity in `unit`.
    pub value: Decimal,
    /// Hours or minutes.
    pub unit: TimeUnit,
}

/// A user-entered deduction or incentive for one cut-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLineItem {
    /// Catalog id.
    pub type_id: String,
    /// Half of the month this entry belongs to.
    pub cutoff: CutOffBucket,
    /// Entered amount. Used as-is for fixed items and manual tax.
    #[serde(default)]
    pub amount: Decimal,
    /// Days absent, for Absent items.
    #[serde(default)]
    pub days: Option<Decimal>,
    /// Late/undertime quantity, for LateUndertime items.
    #[serde(default)]
    pub late_undertime: Option<LateUndertime>,
}
