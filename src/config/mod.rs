//! Configuration loading and management for the engine.
//!
//! This module provides functionality to load engine settings, the
//! deduction-type catalog and seed national holidays from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use dtr_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("COS tax rate: {}", config.payroll().cos_tax_rate);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendanceSettings, EngineConfig, EngineSettings, HolidayCacheSettings, NationalHolidaysFile,
    PayrollSettings, ServerSettings,
};
