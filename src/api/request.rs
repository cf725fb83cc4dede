//! Request types for the payroll API.
//!
//! This module defines the JSON request bodies. Category and month fields
//! arrive as plain strings and are parsed by the handlers, so a bad value is
//! reported as invalid input rather than as malformed JSON. Unit counts are
//! signed so that negative counts reach validation instead of failing to
//! deserialize.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{LeaveDecision, LeaveKind, Role};
use crate::service::NewEmployee;

/// Request body for `POST /admin/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    /// Unique login name.
    pub username: String,
    /// Full name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Employee or admin; defaults to employee.
    #[serde(default)]
    pub role: Role,
    /// Optional department.
    #[serde(default)]
    pub department: Option<String>,
    /// Starting leave balance; the configured default when omitted.
    #[serde(default)]
    pub leave_balance: Option<u32>,
}

impl From<CreateEmployeeRequest> for NewEmployee {
    fn from(req: CreateEmployeeRequest) -> Self {
        NewEmployee {
            username: req.username,
            full_name: req.full_name,
            email: req.email,
            role: req.role,
            department: req.department,
            leave_balance: req.leave_balance,
        }
    }
}

/// Request body for `POST /attendance/check-in` and `/attendance/check-out`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The employee.
    pub user_id: u64,
    /// The working day; today (UTC) when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Request body for `POST /surveys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySubmissionRequest {
    /// The employee.
    pub user_id: u64,
    /// The survey category name.
    pub survey_type: String,
    /// Units completed.
    pub completed: i64,
    /// The day submitted for; today (UTC) when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Request body for `POST /admin/rejected-surveys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionRequest {
    /// The employee whose surveys were rejected.
    pub user_id: u64,
    /// The month, `YYYY-MM`.
    pub month: String,
    /// The survey category name.
    pub survey_type: String,
    /// Units rejected.
    pub rejected: i64,
    /// The admin recording the rejection.
    pub admin_id: u64,
}

/// Request body for `POST /leave`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// The employee asking for leave.
    pub user_id: u64,
    /// The kind of leave.
    pub leave_type: LeaveKind,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Why the leave is needed.
    pub reason: String,
}

/// Request body for `PUT /admin/leave/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveDecisionRequest {
    /// `approved` or `rejected`.
    pub status: LeaveDecision,
    /// The admin deciding.
    pub admin_id: u64,
}

/// Request body for `POST /admin/calculate-salary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateSalaryRequest {
    /// The employee to pay.
    pub user_id: u64,
    /// The month, `YYYY-MM`.
    pub month: String,
    /// The admin running the calculation.
    pub admin_id: u64,
}
