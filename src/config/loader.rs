//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{DeductionCatalog, DeductionType, NationalHoliday};

use super::types::{EngineConfig, EngineSettings, NationalHolidaysFile, PayrollSettings};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml             # Offsets, payroll parameters, office hours
/// ├── deduction_types.yaml    # Deduction/incentive catalog
/// └── national_holidays.yaml  # Optional seed for the holiday feed
/// ```
///
/// # Example
///
/// ```no_run
/// use dtr_payroll::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Catalog has {} types", loader.catalog().types().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `engine.yaml` or `deduction_types.yaml` is
    /// missing or malformed. `national_holidays.yaml` is optional.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let types = Self::load_yaml::<Vec<DeductionType>>(&path.join("deduction_types.yaml"))?;

        let holidays_path = path.join("national_holidays.yaml");
        let national_holidays = if holidays_path.exists() {
            Self::load_yaml::<NationalHolidaysFile>(&holidays_path)?.holidays
        } else {
            Vec::new()
        };

        info!(
            path = %path.display(),
            deduction_types = types.len(),
            national_holidays = national_holidays.len(),
            "Loaded engine configuration"
        );

        let config = EngineConfig::new(settings, DeductionCatalog::new(types), national_holidays);
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Returns the payroll rule parameters.
    pub fn payroll(&self) -> &PayrollSettings {
        &self.config.settings().payroll
    }

    /// Returns the deduction-type catalog.
    pub fn catalog(&self) -> &DeductionCatalog {
        self.config.catalog()
    }

    /// Returns the seed national holidays.
    pub fn national_holidays(&self) -> &[NationalHoliday] {
        self.config.national_holidays()
    }
}
