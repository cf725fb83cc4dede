//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log lines with a fresh correlation id.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeUpdate, Month, SurveyCategory};
use crate::service::NewLeaveRequest;

use super::request::{
    AttendanceRequest, CalculateSalaryRequest, CreateEmployeeRequest, LeaveApplication,
    LeaveDecisionRequest, RejectionRequest, SurveySubmissionRequest,
};
use super::response::{ApiError, ApiErrorResponse, LeaveDaysResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/admin/employees",
            post(create_employee_handler).get(list_employees_handler),
        )
        .route(
            "/admin/employees/:id",
            get(get_employee_handler)
                .put(update_employee_handler)
                .delete(delete_employee_handler),
        )
        .route("/attendance/check-in", post(check_in_handler))
        .route("/attendance/check-out", post(check_out_handler))
        .route("/attendance/:user_id", get(list_attendance_handler))
        .route("/attendance/:user_id/today", get(attendance_today_handler))
        .route("/admin/attendance", get(attendance_today_for_all_handler))
        .route("/admin/attendance/:date", get(attendance_by_date_handler))
        .route("/surveys", post(submit_survey_handler))
        .route("/surveys/:user_id", get(list_surveys_handler))
        .route("/surveys/:user_id/today", get(surveys_today_handler))
        .route("/admin/surveys", get(surveys_today_for_all_handler))
        .route("/admin/surveys/:date", get(surveys_by_date_handler))
        .route("/admin/rejected-surveys", post(record_rejection_handler))
        .route("/admin/rejected-surveys/:month", get(list_rejections_handler))
        .route("/leave", post(request_leave_handler))
        .route("/leave/:user_id", get(list_user_leave_handler))
        .route("/admin/leave", get(list_pending_leave_handler))
        .route("/admin/leave/:id", put(decide_leave_handler))
        .route("/leave-days/:user_id/:month", get(leave_days_handler))
        .route("/admin/calculate-salary", post(calculate_salary_handler))
        .route("/salary/:user_id/:month", get(get_salary_handler))
        .route("/admin/salaries/:month", get(list_salaries_handler))
        .route("/admin/stats", get(current_dashboard_handler))
        .route("/admin/stats/:month", get(dashboard_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

fn respond<T: Serialize>(correlation_id: Uuid, status: StatusCode, result: EngineResult<T>) -> Response {
    match result {
        Ok(body) => json_response(status, body),
        Err(error) => error_response(correlation_id, error),
    }
}

fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        EngineError::invalid_input("date", format!("expected YYYY-MM-DD, got '{}'", value))
    })
}

/// Unwraps a JSON body, turning a rejection into a 400 response.
fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
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

/// Handler for POST /admin/employees.
async fn create_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing create employee request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.service().create_employee(request.into()).await;
    respond(correlation_id, StatusCode::CREATED, result)
}

/// Handler for GET /admin/employees/:id.
async fn get_employee_handler(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = id, "Fetching employee");
    respond(correlation_id, StatusCode::OK, state.service().get_employee(id).await)
}

/// Handler for GET /admin/employees.
async fn list_employees_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Listing employees");
    respond(correlation_id, StatusCode::OK, state.service().list_employees().await)
}

/// Handler for PUT /admin/employees/:id.
async fn update_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = id, "Processing employee update");

    let update = match parse_body(correlation_id, payload) {
        Ok(update) => update,
        Err(response) => return response,
    };
    let result = state.service().update_employee(id, update).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for DELETE /admin/employees/:id.
///
/// Returns the removed employee.
async fn delete_employee_handler(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = id, "Deleting employee");
    respond(correlation_id, StatusCode::OK, state.service().delete_employee(id).await)
}

/// Handler for POST /attendance/check-in.
///
/// Answers 201 when the check-in creates the day's record and 200 when the
/// employee had already checked in.
async fn check_in_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing check-in");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let now = Utc::now();
    let date = request.date.unwrap_or_else(|| now.date_naive());
    match state.service().check_in(request.user_id, date, now).await {
        Ok(check_in) => {
            let status = if check_in.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            json_response(status, check_in.attendance)
        }
        Err(error) => error_response(correlation_id, error),
    }
}

/// Handler for POST /attendance/check-out.
async fn check_out_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing check-out");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let now = Utc::now();
    let date = request.date.unwrap_or_else(|| now.date_naive());
    let result = state.service().check_out(request.user_id, date, now).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /attendance/:user_id.
async fn list_attendance_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id, "Listing attendance");
    let result = state.service().list_attendance_for_user(user_id).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /attendance/:user_id/today.
///
/// The body is `null` when the employee has not checked in today (UTC).
async fn attendance_today_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id, "Fetching today's attendance");
    let today = Utc::now().date_naive();
    let result = state.service().attendance_for_day(user_id, today).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/attendance.
async fn attendance_today_for_all_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    let today = Utc::now().date_naive();
    info!(correlation_id = %correlation_id, date = %today, "Listing attendance");
    let result = state.service().attendance_by_date(today).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/attendance/:date.
async fn attendance_by_date_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, date = %date, "Listing attendance");

    let date = match parse_date(&date) {
        Ok(date) => date,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state.service().attendance_by_date(date).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /surveys.
async fn submit_survey_handler(
    State(state): State<AppState>,
    payload: Result<Json<SurveySubmissionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing survey submission");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let category = match request.survey_type.parse::<SurveyCategory>() {
        Ok(category) => category,
        Err(error) => return error_response(correlation_id, error),
    };
    let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
    let result = state
        .service()
        .submit_piecework(request.user_id, category, request.completed, date)
        .await;
    respond(correlation_id, StatusCode::CREATED, result)
}

/// Handler for GET /surveys/:user_id.
async fn list_surveys_handler(State(state): State<AppState>, Path(user_id): Path<u64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id, "Listing survey submissions");
    let result = state.service().list_piecework_for_user(user_id).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /surveys/:user_id/today.
///
/// Every category is present; categories not yet submitted today are `null`.
async fn surveys_today_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id, "Fetching today's survey submissions");
    let today = Utc::now().date_naive();
    let result = state.service().piecework_for_day(user_id, today).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/surveys.
async fn surveys_today_for_all_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    let today = Utc::now().date_naive();
    info!(correlation_id = %correlation_id, date = %today, "Listing survey submissions");
    let result = state.service().piecework_by_date(today).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/surveys/:date.
async fn surveys_by_date_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, date = %date, "Listing survey submissions");

    let date = match parse_date(&date) {
        Ok(date) => date,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state.service().piecework_by_date(date).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /admin/rejected-surveys.
async fn record_rejection_handler(
    State(state): State<AppState>,
    payload: Result<Json<RejectionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing rejected surveys");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let month = match request.month.parse::<Month>() {
        Ok(month) => month,
        Err(error) => return error_response(correlation_id, error),
    };
    let category = match request.survey_type.parse::<SurveyCategory>() {
        Ok(category) => category,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state
        .service()
        .record_rejection(request.user_id, month, category, request.rejected, request.admin_id)
        .await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/rejected-surveys/:month.
async fn list_rejections_handler(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, month = %month, "Listing rejected surveys");

    let month = match month.parse::<Month>() {
        Ok(month) => month,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state.service().list_rejections(month).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /leave.
async fn request_leave_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveApplication>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing leave request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let new = NewLeaveRequest {
        user_id: request.user_id,
        leave_kind: request.leave_type,
        start_date: request.start_date,
        end_date: request.end_date,
        reason: request.reason,
    };
    let result = state.service().request_leave(new, Utc::now()).await;
    respond(correlation_id, StatusCode::CREATED, result)
}

/// Handler for GET /leave/:user_id.
async fn list_user_leave_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id, "Listing leave requests");
    let result = state.service().list_leave_for_user(user_id).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/leave.
async fn list_pending_leave_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Listing pending leave requests");
    let result = state.service().list_pending_leave().await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for PUT /admin/leave/:id.
async fn decide_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<LeaveDecisionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, leave_request_id = id, "Processing leave decision");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state
        .service()
        .decide_leave_request(id, request.status, request.admin_id)
        .await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /leave-days/:user_id/:month.
async fn leave_days_handler(
    State(state): State<AppState>,
    Path((user_id, month)): Path<(u64, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id, month = %month, "Counting leave days");

    let month = match month.parse::<Month>() {
        Ok(month) => month,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state
        .service()
        .count_approved_leave_days(user_id, month)
        .await
        .map(|leave_days| LeaveDaysResponse {
            user_id,
            month,
            leave_days,
        });
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /admin/calculate-salary.
///
/// Calculates, stores and returns the salary together with its audit trace.
async fn calculate_salary_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculateSalaryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary calculation request");

    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let month = match request.month.parse::<Month>() {
        Ok(month) => month,
        Err(error) => return error_response(correlation_id, error),
    };

    match state
        .service()
        .calculate_salary(request.user_id, month, request.admin_id)
        .await
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %result.calculation_id,
                user_id = request.user_id,
                final_pay = %result.salary.final_pay,
                duration_us = result.audit_trace.duration_us,
                "Salary calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(error) => error_response(correlation_id, error),
    }
}

/// Handler for GET /salary/:user_id/:month.
async fn get_salary_handler(
    State(state): State<AppState>,
    Path((user_id, month)): Path<(u64, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id, month = %month, "Fetching salary");

    let month = match month.parse::<Month>() {
        Ok(month) => month,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state.service().get_salary(user_id, month).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/salaries/:month.
async fn list_salaries_handler(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, month = %month, "Listing salaries");

    let month = match month.parse::<Month>() {
        Ok(month) => month,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state.service().list_salaries(month).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/stats.
///
/// Dashboard figures for today and the current month (UTC).
async fn current_dashboard_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    let today = Utc::now().date_naive();
    info!(correlation_id = %correlation_id, date = %today, "Computing dashboard stats");
    let result = state.service().dashboard_stats(Month::of(today), today).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /admin/stats/:month.
async fn dashboard_handler(State(state): State<AppState>, Path(month): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, month = %month, "Computing dashboard stats");

    let month = match month.parse::<Month>() {
        Ok(month) => month,
        Err(error) => return error_response(correlation_id, error),
    };
    let result = state
        .service()
        .dashboard_stats(month, Utc::now().date_naive())
        .await;
    respond(correlation_id, StatusCode::OK, result)
}
