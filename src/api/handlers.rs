//! HTTP request handlers for the DTR and payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Datelike;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::AttendanceLedger;
use crate::calculation::{classify_day_for, compute_payslip, resolve_cutoff_days, resolve_cutoff_range};
use crate::error::EngineError;

use super::request::{
    AttendanceSummaryRequest, ClassifyDayRequest, CutOffDaysRequest, CutOffDaysResponse,
    DailyTimeRecordRequest, PayslipRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payslip", post(payslip_handler))
        .route("/cutoff/days", post(cutoff_days_handler))
        .route("/calendar/classify", post(classify_day_handler))
        .route("/attendance/summary", post(attendance_summary_handler))
        .route("/attendance/dtr", post(daily_time_record_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Unwraps a JSON body, turning extractor rejections into 400 responses.
fn parse_payload<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message, including the field path.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(json_response(StatusCode::BAD_REQUEST, error))
}

/// Handler for POST /payslip.
///
/// Computes a payslip preview with the server's catalog and payroll
/// settings. Nothing is persisted.
async fn payslip_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayslipRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payslip request");

    let request = match parse_payload(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let config = state.config();
    let payslip = compute_payslip(&request.as_input(), config.catalog(), config.payroll());

    info!(
        correlation_id = %correlation_id,
        employee_id = %payslip.employee_id,
        line_items = request.line_items.len(),
        net_pay = %payslip.totals.net_pay,
        warnings = payslip.audit_trace.warnings.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Payslip computed"
    );
    json_response(StatusCode::OK, payslip)
}

/// Handler for POST /cutoff/days.
async fn cutoff_days_handler(payload: Result<Json<CutOffDaysRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match parse_payload(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let days = resolve_cutoff_days(&request.cutoff);
    info!(
        correlation_id = %correlation_id,
        cutoff = %request.cutoff.name,
        days = days.len(),
        "Resolved cut-off days"
    );
    json_response(StatusCode::OK, CutOffDaysResponse { days })
}

/// Handler for POST /calendar/classify.
///
/// National holidays for the date's year come from the holiday cache and
/// are added to whatever calendars the request carries.
async fn classify_day_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyDayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let mut request = match parse_payload(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.holidays().get_or_fetch(request.date.year()) {
        Ok(holidays) => request
            .calendars
            .national_holidays
            .extend(holidays.iter().cloned()),
        Err(err) => return error_response(correlation_id, err),
    }

    let classification =
        classify_day_for(request.date, &request.calendars, request.employee_id.as_deref());
    info!(
        correlation_id = %correlation_id,
        date = %request.date,
        kind = %classification.kind,
        "Classified day"
    );
    json_response(StatusCode::OK, classification)
}

/// Handler for POST /attendance/summary.
///
/// Responds with the summary, or `null` when the employee has no punches
/// on the date.
async fn attendance_summary_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceSummaryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance summary request");

    let request = match parse_payload(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    if !request.roster.iter().any(|e| e.emp_id == request.employee_id) {
        return error_response(
            correlation_id,
            EngineError::EmployeeNotFound {
                employee_id: request.employee_id,
            },
        );
    }

    let ledger = AttendanceLedger::ingest(&request.roster, &request.punches, state.config().settings());
    let summary = ledger.get_daily_attendance_summary(&request.employee_id, request.date);

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        date = %request.date,
        has_logs = summary.is_some(),
        unresolved = ledger.stats().unresolved,
        "Attendance summary built"
    );
    json_response(StatusCode::OK, summary)
}

/// Handler for POST /attendance/dtr.
async fn daily_time_record_handler(
    State(state): State<AppState>,
    payload: Result<Json<DailyTimeRecordRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing DTR request");

    let mut request = match parse_payload(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    // An unresolvable cut-off is reported by the ledger below.
    if let Some(range) = resolve_cutoff_range(&request.cutoff) {
        match state.holidays().holidays_in(&range) {
            Ok(holidays) => request.calendars.national_holidays.extend(holidays),
            Err(err) => return error_response(correlation_id, err),
        }
    }

    let start_time = Instant::now();
    let ledger = AttendanceLedger::ingest(&request.roster, &request.punches, state.config().settings());
    match ledger.daily_time_record(&request.employee_id, &request.cutoff, &request.calendars) {
        Ok(dtr) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %dtr.employee_id,
                days = dtr.rows.len(),
                absences = dtr.totals.absences,
                duration_us = start_time.elapsed().as_micros(),
                "DTR built"
            );
            json_response(StatusCode::OK, dtr)
        }
        Err(err) => error_response(correlation_id, err),
    }
}
