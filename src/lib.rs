//! DTR and Payroll Engine
//!
//! This crate reconciles raw biometric punch logs into daily time records,
//! overlays holiday, suspension and training calendars, and computes
//! auditable payslips from cut-off periods and formula-driven deductions.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod config;
pub mod error;
pub mod holidays;
pub mod models;
