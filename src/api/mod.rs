//! HTTP API module for the DTR and payroll engine.
//!
//! This module exposes payslip previews, cut-off resolution, day
//! classification and attendance summaries over JSON. Requests carry the
//! roster and punch snapshots they need; the server holds only its
//! configuration and the national holiday cache.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceSummaryRequest, ClassifyDayRequest, CutOffDaysRequest, CutOffDaysResponse,
    DailyTimeRecordRequest, PayslipRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::{AppState, SharedHolidayCache};
