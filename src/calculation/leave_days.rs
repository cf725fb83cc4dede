//! Approved leave-day counting.
//!
//! This module provides the function that counts how many calendar days of
//! approved leave fall inside a calendar month.

use crate::models::{AuditStep, LeaveRequest, Month};

/// The result of counting leave days, including the audit step.
#[derive(Debug, Clone)]
pub struct LeaveDayCountResult {
    /// Approved leave days that fall inside the month.
    pub leave_days: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Counts the approved leave days of `requests` that fall inside `month`.
///
/// Each request's inclusive date range is clipped to the month's first and
/// last day. Requests that are not approved are skipped whatever their dates,
/// and overlapping approved requests are summed independently.
///
/// # Examples
///
/// ```
/// use survey_payroll::calculation::count_leave_days_in_month;
/// use survey_payroll::models::{LeaveKind, LeaveRequest, LeaveStatus, Month};
/// use chrono::{NaiveDate, Utc};
///
/// let request = LeaveRequest {
///     id: 1,
///     user_id: 7,
///     leave_kind: LeaveKind::Vacation,
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
///     reason: "Trip".to_string(),
///     status: LeaveStatus::Approved,
///     decided_by: Some(1),
///     created_at: Utc::now(),
/// };
///
/// let january: Month = "2024-01".parse().unwrap();
/// let result = count_leave_days_in_month(&[request], january, 1);
/// assert_eq!(result.leave_days, 4);
/// ```
pub fn count_leave_days_in_month(
    requests: &[LeaveRequest],
    month: Month,
    step_number: u32,
) -> LeaveDayCountResult {
    let mut leave_days = 0u32;
    let mut counted = Vec::new();

    for request in requests.iter().filter(|r| r.is_approved()) {
        let days = request.days_within(month);
        if days > 0 {
            leave_days += days;
            counted.push(serde_json::json!({
                "leave_request_id": request.id,
                "start_date": request.start_date.to_string(),
                "end_date": request.end_date.to_string(),
                "days_in_month": days
            }));
        }
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_days".to_string(),
        rule_name: "Approved Leave Days".to_string(),
        input: serde_json::json!({
            "month": month.to_string(),
            "requests_considered": requests.len()
        }),
        output: serde_json::json!({
            "leave_days": leave_days,
            "counted": counted
        }),
        reasoning: format!(
            "{} approved leave day(s) fall between {} and {}",
            leave_days,
            month.first_day(),
            month.last_day()
        ),
    };

    LeaveDayCountResult {
        leave_days,
        audit_step,
    }
}
