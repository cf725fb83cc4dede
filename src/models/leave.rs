//! Leave request model.
//!
//! This module contains the [`LeaveRequest`] type together with its kind,
//! status and decision enums.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{AuditTrace, Month};
use super::month::inclusive_days;

/// The kind of leave requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveKind {
    /// Medical leave.
    Medical,
    /// Personal leave.
    Personal,
    /// Vacation.
    Vacation,
    /// Anything else.
    Other,
}

/// The lifecycle state of a leave request.
///
/// Requests start `Pending` and move exactly once to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved; counts towards leave days.
    Approved,
    /// Rejected; never counts.
    Rejected,
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// An admin's decision on a pending leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveDecision {
    /// Approve the request.
    Approved,
    /// Reject the request.
    Rejected,
}

impl From<LeaveDecision> for LeaveStatus {
    fn from(decision: LeaveDecision) -> Self {
        match decision {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// A request for leave over an inclusive date range.
///
/// # Example
///
/// ```
/// use survey_payroll::models::{LeaveKind, LeaveRequest, LeaveStatus, Month};
/// use chrono::{NaiveDate, Utc};
///
/// let request = LeaveRequest {
///     id: 1,
///     user_id: 7,
///     leave_kind: LeaveKind::Vacation,
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
///     reason: "Family trip".to_string(),
///     status: LeaveStatus::Approved,
///     decided_by: Some(1),
///     created_at: Utc::now(),
/// };
///
/// assert_eq!(request.inclusive_days(), 7);
/// assert_eq!(request.days_within("2024-01".parse::<Month>().unwrap()), 4);
/// assert_eq!(request.days_within("2024-02".parse::<Month>().unwrap()), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Identifier assigned by the store.
    pub id: u64,
    /// The employee requesting leave.
    pub user_id: u64,
    /// The kind of leave.
    pub leave_kind: LeaveKind,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// The employee's reason.
    pub reason: String,
    /// Current lifecycle state.
    pub status: LeaveStatus,
    /// The admin who decided the request; `None` while pending.
    pub decided_by: Option<u64>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Returns true if the request has been approved.
    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }

    /// The number of calendar days covered, counting both ends.
    pub fn inclusive_days(&self) -> u32 {
        inclusive_days(self.start_date, self.end_date)
    }

    /// The number of covered days that fall inside `month`.
    ///
    /// The request's range is clipped to the month's first and last day;
    /// a request with no overlap contributes zero.
    pub fn days_within(&self, month: Month) -> u32 {
        let start = self.start_date.max(month.first_day());
        let end = self.end_date.min(month.last_day());
        inclusive_days(start, end)
    }
}

/// The result of deciding a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDecisionOutcome {
    /// The request as committed.
    pub request: LeaveRequest,
    /// The employee's leave balance after an approval; `None` on rejection.
    pub leave_balance: Option<u32>,
    /// The decision and balance steps.
    pub audit_trace: AuditTrace,
}
