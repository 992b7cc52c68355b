//! Configuration types for the engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{DeductionCatalog, NationalHoliday};

/// Payroll rule parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    /// Tax rate applied to a COS employee's taxable base.
    pub cos_tax_rate: Decimal,
    /// Hours in a working day, used for late/undertime rates.
    pub work_hours_per_day: u32,
    /// Working days in a month, used when the roster has no daily rate.
    pub working_days_per_month: u32,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            cos_tax_rate: Decimal::new(3, 2),
            work_hours_per_day: 8,
            working_days_per_month: 22,
        }
    }
}

/// Office hours used for tardiness and undertime on the DTR.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttendanceSettings {
    /// Start of the working day.
    pub office_start: NaiveTime,
    /// End of the working day.
    pub office_end: NaiveTime,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            office_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            office_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
        }
    }
}

/// National holiday cache policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HolidayCacheSettings {
    /// Hours a cached year stays valid before it is fetched again.
    pub ttl_hours: u64,
}

impl Default for HolidayCacheSettings {
    fn default() -> Self {
        Self { ttl_hours: 24 * 30 }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Offset of the office's local time from UTC, in hours.
    pub utc_offset_hours: i32,
    /// Payroll rule parameters.
    pub payroll: PayrollSettings,
    /// Office hours.
    pub attendance: AttendanceSettings,
    /// Holiday cache policy.
    pub holiday_cache: HolidayCacheSettings,
    /// HTTP server settings.
    pub server: ServerSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            payroll: PayrollSettings::default(),
            attendance: AttendanceSettings::default(),
            holiday_cache: HolidayCacheSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl EngineSettings {
    /// The local UTC offset; out-of-range values fall back to UTC.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Contents of `national_holidays.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NationalHolidaysFile {
    /// Seed holidays for the static feed.
    #[serde(default)]
    pub holidays: Vec<NationalHoliday>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    catalog: DeductionCatalog,
    national_holidays: Vec<NationalHoliday>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        settings: EngineSettings,
        catalog: DeductionCatalog,
        national_holidays: Vec<NationalHoliday>,
    ) -> Self {
        let mut national_holidays = national_holidays;
        national_holidays.sort_by_key(|h| h.date);
        Self {
            settings,
            catalog,
            national_holidays,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the deduction-type catalog.
    pub fn catalog(&self) -> &DeductionCatalog {
        &self.catalog
    }

    /// Returns the seed national holidays, sorted by date.
    pub fn national_holidays(&self) -> &[NationalHoliday] {
        &self.national_holidays
    }
}
