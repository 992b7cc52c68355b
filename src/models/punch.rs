//! Punch log models.
//!
//! Biometric devices export punches with free-text states ("Check In",
//! "C/Out", "OT-In", ...). [`PunchState::from_label`] folds those synonyms
//! onto six canonical states before any aggregation happens.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A punch as received from the device export, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunch {
    /// AC-No or free text identifying who punched.
    pub identifier_raw: String,
    /// ISO-8601 timestamp, with or without offset.
    pub time: String,
    /// Free-text state label.
    pub state: String,
}

/// Canonical punch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchState {
    /// Start of the working day.
    TimeIn,
    /// Leaving for the midday break.
    BreakOut,
    /// Returning from the midday break.
    BreakIn,
    /// End of the working day.
    TimeOut,
    /// Start of overtime.
    OtIn,
    /// End of overtime.
    OtOut,
}

impl PunchState {
    /// Maps a free-text device label onto a canonical state.
    ///
    /// Matching ignores case, whitespace and punctuation, so `"C/In"`,
    /// `"check-in"` and `"CHECK IN"` are all [`PunchState::TimeIn`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dtr_payroll::models::PunchState;
    ///
    /// assert_eq!(PunchState::from_label("Check In"), Some(PunchState::TimeIn));
    /// assert_eq!(PunchState::from_label("C/Out"), Some(PunchState::TimeOut));
    /// assert_eq!(PunchState::from_label("OT-In"), Some(PunchState::OtIn));
    /// assert_eq!(PunchState::from_label("coffee"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        let state = match key.as_str() {
            "in" | "checkin" | "cin" | "timein" | "clockin" | "login" => PunchState::TimeIn,
            "out" | "checkout" | "cout" | "timeout" | "clockout" | "logout" => {
                PunchState::TimeOut
            }
            "breakout" | "bout" | "outforbreak" | "lunchout" => PunchState::BreakOut,
            "breakin" | "bin" | "backfrombreak" | "lunchin" => PunchState::BreakIn,
            "otin" | "overtimein" => PunchState::OtIn,
            "otout" | "overtimeout" => PunchState::OtOut,
            _ => return None,
        };
        Some(state)
    }

    /// True for states where the earliest punch of the day is kept.
    pub fn earliest_wins(self) -> bool {
        matches!(
            self,
            PunchState::TimeIn | PunchState::BreakOut | PunchState::OtIn
        )
    }
}

impl std::fmt::Display for PunchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PunchState::TimeIn => write!(f, "Time In"),
            PunchState::BreakOut => write!(f, "Break Out"),
            PunchState::BreakIn => write!(f, "Break In"),
            PunchState::TimeOut => write!(f, "Time Out"),
            PunchState::OtIn => write!(f, "OT In"),
            PunchState::OtOut => write!(f, "OT Out"),
        }
    }
}

/// A normalized punch in local time. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchLog {
    /// The identifier exactly as the device reported it.
    pub identifier_raw: String,
    /// Local wall-clock time of the punch.
    pub timestamp: NaiveDateTime,
    /// Canonical state.
    pub state: PunchState,
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 punch timestamp into local wall-clock time.
///
/// Timestamps carrying an offset (`Z`, `+08:00`) are converted to
/// `local_offset`; naive timestamps are taken as already local.
///
/// # Examples
///
/// ```
/// use chrono::FixedOffset;
/// use dtr_payroll::models::parse_punch_timestamp;
///
/// let manila = FixedOffset::east_opt(8 * 3600).unwrap();
/// let local = parse_punch_timestamp("2025-03-03T00:15:00Z", manila).unwrap();
/// assert_eq!(local.to_string(), "2025-03-03 08:15:00");
/// ```
pub fn parse_punch_timestamp(raw: &str, local_offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&local_offset).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

impl RawPunch {
    /// Interprets the state label and timestamp.
    ///
    /// Returns [`EngineError::InvalidPunch`] when either cannot be understood.
    pub fn normalize(&self, local_offset: FixedOffset) -> EngineResult<PunchLog> {
        let state = PunchState::from_label(&self.state).ok_or_else(|| EngineError::InvalidPunch {
            identifier: self.identifier_raw.clone(),
            message: format!("unknown punch state '{}'", self.state),
        })?;
        let timestamp = parse_punch_timestamp(&self.time, local_offset).ok_or_else(|| {
            EngineError::InvalidPunch {
                identifier: self.identifier_raw.clone(),
                message: format!("unparseable timestamp '{}'", self.time),
            }
        })?;

        Ok(PunchLog {
            identifier_raw: self.identifier_raw.clone(),
            timestamp,
            state,
        })
    }
}
