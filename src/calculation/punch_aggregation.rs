//! Punch aggregation into daily attendance summaries.
//!
//! Punches are grouped by local calendar date and canonical state. Start
//! labels keep their earliest punch (Time In, Break Out, OT In); end labels
//! keep their latest (Time Out, Break In, OT Out). Devices often miss the
//! midday punches, so a day with a Time In gets Break Out = 12:00 and a day
//! with a Time Out gets Break In = 13:00 when those were not punched.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};

use crate::models::{DailyAttendanceSummary, PunchLog, PunchState};

/// Break Out used when Time In was punched but Break Out was not.
pub fn default_break_out() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// Break In used when Time Out was punched but Break In was not.
pub fn default_break_in() -> NaiveTime {
    NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default()
}

/// Builds the summary for one employee and one date.
///
/// `punches` may contain punches from other dates; only those falling on
/// `date` are considered. Returns `None` when no punch falls on the date,
/// in which case no defaults apply either.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveDateTime};
/// use dtr_payroll::calculation::aggregate_day;
/// use dtr_payroll::models::{PunchLog, PunchState};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let punches = vec![
///     PunchLog { identifier_raw: "45".into(), timestamp: at("2025-03-03 07:55"), state: PunchState::TimeIn },
///     PunchLog { identifier_raw: "45".into(), timestamp: at("2025-03-03 17:05"), state: PunchState::TimeOut },
/// ];
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let summary = aggregate_day("EMP-A", day, &punches).unwrap();
/// assert_eq!(summary.break_out_display().as_deref(), Some("12:00"));
/// assert_eq!(summary.break_in_display().as_deref(), Some("1:00"));
/// ```
pub fn aggregate_day(
    employee_id: &str,
    date: NaiveDate,
    punches: &[PunchLog],
) -> Option<DailyAttendanceSummary> {
    let on_date: Vec<&PunchLog> = punches
        .iter()
        .filter(|p| p.timestamp.date() == date)
        .collect();
    summarize(employee_id, date, &on_date)
}

/// Builds summaries for every date an employee has punches on.
pub fn aggregate_by_day(
    employee_id: &str,
    punches: &[PunchLog],
) -> BTreeMap<NaiveDate, DailyAttendanceSummary> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&PunchLog>> = BTreeMap::new();
    for punch in punches {
        by_date.entry(punch.timestamp.date()).or_default().push(punch);
    }

    by_date
        .into_iter()
        .filter_map(|(date, day_punches)| {
            summarize(employee_id, date, &day_punches).map(|summary| (date, summary))
        })
        .collect()
}

fn summarize(
    employee_id: &str,
    date: NaiveDate,
    punches: &[&PunchLog],
) -> Option<DailyAttendanceSummary> {
    if punches.is_empty() {
        return None;
    }

    let mut selected: HashMap<PunchState, NaiveTime> = HashMap::new();
    for punch in punches {
        let time = punch.timestamp.time();
        selected
            .entry(punch.state)
            .and_modify(|kept| {
                let replace = if punch.state.earliest_wins() {
                    time < *kept
                } else {
                    time > *kept
                };
                if replace {
                    *kept = time;
                }
            })
            .or_insert(time);
    }

    let pick = |state: PunchState| selected.get(&state).copied();
    let time_in = pick(PunchState::TimeIn);
    let time_out = pick(PunchState::TimeOut);

    let break_out_defaulted = time_in.is_some() && pick(PunchState::BreakOut).is_none();
    let break_in_defaulted = time_out.is_some() && pick(PunchState::BreakIn).is_none();

    let break_out = if break_out_defaulted {
        Some(default_break_out())
    } else {
        pick(PunchState::BreakOut)
    };
    let break_in = if break_in_defaulted {
        Some(default_break_in())
    } else {
        pick(PunchState::BreakIn)
    };

    Some(DailyAttendanceSummary {
        employee_id: employee_id.to_string(),
        date,
        time_in,
        break_out,
        break_in,
        time_out,
        ot_in: pick(PunchState::OtIn),
        ot_out: pick(PunchState::OtOut),
        has_logs: true,
        break_out_defaulted,
        break_in_defaulted,
        punch_count: punches.len(),
        extra_punches: punches.len() - selected.len(),
    })
}
