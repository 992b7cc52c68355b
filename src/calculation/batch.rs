//! Batch evaluation across employees.
//!
//! Each employee is computed independently. A failure, including a panic,
//! stays in that employee's slot and never aborts the rest of the batch.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::payslip::{PayslipInput, PeraAcaSelection, compute_payslip};
use crate::config::PayrollSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{CutOffRecord, DeductionCatalog, DeductionLineItem, Employee, Payslip};

/// One employee's payslip request within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipJob {
    /// Canonical employee id, looked up in the roster.
    pub employee_id: String,
    /// Selected cut-off.
    #[serde(default)]
    pub period: Option<CutOffRecord>,
    /// Line items for this employee.
    #[serde(default)]
    pub line_items: Vec<DeductionLineItem>,
    /// PERA/ACA selection.
    #[serde(default)]
    pub pera_aca: Option<PeraAcaSelection>,
}

/// Runs `task` over every item on scoped worker threads.
///
/// Results come back in input order. A panicking task yields
/// [`EngineError::CalculationError`] for its item only.
pub fn run_isolated<T, R, F>(items: &[T], task: F) -> Vec<EngineResult<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> EngineResult<R> + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(items.len());
    let chunk_size = items.len().div_ceil(workers);
    let task = &task;

    thread::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|item| {
                            catch_unwind(AssertUnwindSafe(|| task(item))).unwrap_or_else(|panic| {
                                Err(EngineError::CalculationError {
                                    message: panic_message(panic.as_ref()),
                                })
                            })
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .zip(items.chunks(chunk_size))
            .flat_map(|(handle, chunk)| {
                handle.join().unwrap_or_else(|panic| {
                    let message = panic_message(panic.as_ref());
                    chunk
                        .iter()
                        .map(|_| Err(EngineError::CalculationError { message: message.clone() }))
                        .collect()
                })
            })
            .collect()
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("computation panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("computation panicked: {message}")
    } else {
        "computation panicked".to_string()
    }
}

/// Computes payslips for many employees.
///
/// Jobs naming an employee missing from the roster fail with
/// [`EngineError::EmployeeNotFound`].
pub fn compute_payslips_batch(
    roster: &[Employee],
    jobs: &[PayslipJob],
    catalog: &DeductionCatalog,
    settings: &PayrollSettings,
) -> Vec<EngineResult<Payslip>> {
    let results = run_isolated(jobs, |job| {
        let employee = roster
            .iter()
            .find(|e| e.emp_id == job.employee_id)
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: job.employee_id.clone(),
            })?;
        let input = PayslipInput {
            employee,
            period: job.period.as_ref(),
            line_items: &job.line_items,
            pera_aca: job.pera_aca,
        };
        Ok(compute_payslip(&input, catalog, settings))
    });

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(jobs = jobs.len(), failed, "Payslip batch finished with failures");
    } else {
        info!(jobs = jobs.len(), "Payslip batch finished");
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeType, SalaryInfo};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn employee(emp_id: &str, monthly: i64) -> Employee {
        Employee {
            emp_id: emp_id.to_string(),
            emp_no: None,
            ac_no: None,
            alternate_emp_ids: vec![],
            name: format!("Employee {emp_id}"),
            normalized_name: None,
            employee_type: EmployeeType::ContractOfService,
            division: None,
            section_or_unit: None,
            position: None,
            salary_info: SalaryInfo {
                rate_per_month: Decimal::new(monthly, 0),
                daily_rate: None,
                basic_salary: None,
            },
        }
    }

    fn job(employee_id: &str) -> PayslipJob {
        PayslipJob {
            employee_id: employee_id.to_string(),
            period: Some(CutOffRecord {
                name: "March 2025".to_string(),
                period_start: NaiveDate::from_ymd_opt(2025, 3, 1),
                period_end: NaiveDate::from_ymd_opt(2025, 3, 31),
            }),
            line_items: vec![],
            pera_aca: None,
        }
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_missing_employee() {
        let roster = vec![employee("EMP-1", 20000), employee("EMP-2", 30000)];
        let jobs = vec![job("EMP-2"), job("GHOST"), job("EMP-1")];

        let results = compute_payslips_batch(
            &roster,
            &jobs,
            &DeductionCatalog::default(),
            &PayrollSettings::default(),
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().totals.earnings, Decimal::new(30000, 0));
        assert!(matches!(
            &results[1],
            Err(EngineError::EmployeeNotFound { employee_id }) if employee_id == "GHOST"
        ));
        assert_eq!(results[2].as_ref().unwrap().employee_id, "EMP-1");
    }

    #[test]
    fn test_panicking_task_is_isolated() {
        let items: Vec<u32> = (0..16).collect();
        let results = run_isolated(&items, |&n| {
            if n == 7 {
                panic!("bad input {n}");
            }
            Ok(n * 2)
        });

        assert_eq!(results.len(), 16);
        for (n, result) in results.iter().enumerate() {
            match result {
                Ok(doubled) => assert_eq!(*doubled, n as u32 * 2),
                Err(EngineError::CalculationError { message }) => {
                    assert_eq!(n, 7);
                    assert!(message.contains("bad input 7"));
                }
                Err(other) => panic!("unexpected error {other}"),
            }
        }
    }

    #[test]
    fn test_empty_batch() {
        let results = run_isolated(&Vec::<u32>::new(), |&n| Ok(n));
        assert!(results.is_empty());
    }
}
