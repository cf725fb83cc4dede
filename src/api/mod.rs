//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for attendance, survey
//! submissions, leave requests and monthly salary calculation.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceRequest, CalculateSalaryRequest, CreateEmployeeRequest, LeaveApplication,
    LeaveDecisionRequest, RejectionRequest, SurveySubmissionRequest,
};
pub use response::{ApiError, ApiErrorResponse, LeaveDaysResponse};
pub use state::AppState;
