//! Error types for the DTR and payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while reconciling attendance
//! and computing payslips.

use thiserror::Error;

/// The main error type for the engine.
///
/// Most calculations are infallible by construction (bad inputs degrade to
/// zero totals or excluded punches); this type covers configuration,
/// lookups, and the few operations that must reject their input.
///
/// # Example
///
/// ```
/// use dtr_payroll::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No employee with the given canonical id exists in the roster.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The canonical employee id that was requested.
        employee_id: String,
    },

    /// A cut-off record has missing or inverted dates.
    #[error("Invalid cut-off period '{name}': {message}")]
    InvalidPeriod {
        /// The cut-off record name.
        name: String,
        /// What made the period invalid.
        message: String,
    },

    /// A raw punch could not be interpreted.
    #[error("Invalid punch from '{identifier}': {message}")]
    InvalidPunch {
        /// The raw identifier carried by the punch.
        identifier: String,
        /// Why the punch was rejected.
        message: String,
    },

    /// The national holiday feed failed for a year.
    #[error("Holiday feed failed for {year}: {message}")]
    HolidayFeed {
        /// The calendar year requested.
        year: i32,
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_employee_not_found_displays_id() {
        let error = EngineError::EmployeeNotFound {
            employee_id: "EMP-0042".to_string(),
        };
        assert_eq!(error.to_string(), "Employee not found: EMP-0042");
    }

    #[test]
    fn test_invalid_period_displays_name_and_message() {
        let error = EngineError::InvalidPeriod {
            name: "March 2025".to_string(),
            message: "period_start is after period_end".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid cut-off period 'March 2025': period_start is after period_end"
        );
    }

    #[test]
    fn test_invalid_punch_displays_identifier() {
        let error = EngineError::InvalidPunch {
            identifier: "0012".to_string(),
            message: "unparseable timestamp".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid punch from '0012': unparseable timestamp"
        );
    }

    #[test]
    fn test_holiday_feed_displays_year() {
        let error = EngineError::HolidayFeed {
            year: 2025,
            message: "timeout".to_string(),
        };
        assert_eq!(error.to_string(), "Holiday feed failed for 2025: timeout");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::EmployeeNotFound {
                employee_id: "x".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
