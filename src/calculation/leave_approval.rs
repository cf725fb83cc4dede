//! Leave request decisions and balance updates.

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, LeaveDecision, LeaveRequest, LeaveStatus};

/// The outcome of deciding a leave request.
#[derive(Debug, Clone)]
pub struct LeaveDecisionResult {
    /// The request with its new status and decider.
    pub request: LeaveRequest,
    /// Inclusive days covered by the request.
    pub day_count: u32,
    /// Days to take off the employee's leave balance; zero on rejection.
    pub balance_deduction: u32,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Applies an admin's decision to a pending leave request.
///
/// Approval asks for the inclusive day count to be deducted from the
/// employee's balance. Rejection deducts nothing. The balance itself is not
/// read here: the store applies the deduction atomically, see
/// [`apply_leave_balance_deduction`].
///
/// # Errors
///
/// Returns [`EngineError::LeaveAlreadyDecided`] if the request is no longer
/// pending. A decided request is terminal.
///
/// # Examples
///
/// ```
/// use survey_payroll::calculation::decide_leave;
/// use survey_payroll::models::{LeaveDecision, LeaveKind, LeaveRequest, LeaveStatus};
/// use chrono::{NaiveDate, Utc};
///
/// let request = LeaveRequest {
///     id: 3,
///     user_id: 7,
///     leave_kind: LeaveKind::Personal,
///     start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
///     reason: "Moving house".to_string(),
///     status: LeaveStatus::Pending,
///     decided_by: None,
///     created_at: Utc::now(),
/// };
///
/// let result = decide_leave(&request, LeaveDecision::Approved, 1, 1).unwrap();
/// assert_eq!(result.day_count, 3);
/// assert_eq!(result.balance_deduction, 3);
/// ```
pub fn decide_leave(
    request: &LeaveRequest,
    decision: LeaveDecision,
    admin_id: u64,
    step_number: u32,
) -> EngineResult<LeaveDecisionResult> {
    if request.status != LeaveStatus::Pending {
        return Err(EngineError::LeaveAlreadyDecided {
            id: request.id,
            status: request.status,
        });
    }

    let day_count = request.inclusive_days();
    let status = LeaveStatus::from(decision);
    let balance_deduction = match decision {
        LeaveDecision::Approved => day_count,
        LeaveDecision::Rejected => 0,
    };

    let mut decided = request.clone();
    decided.status = status;
    decided.decided_by = Some(admin_id);

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_decision".to_string(),
        rule_name: "Leave Decision".to_string(),
        input: serde_json::json!({
            "leave_request_id": request.id,
            "decision": status.to_string(),
            "start_date": request.start_date,
            "end_date": request.end_date,
            "decided_by": admin_id
        }),
        output: serde_json::json!({
            "status": status.to_string(),
            "day_count": day_count,
            "balance_deduction": balance_deduction
        }),
        reasoning: match decision {
            LeaveDecision::Approved => format!(
                "Approved {} day(s) from {} to {} inclusive",
                day_count, request.start_date, request.end_date
            ),
            LeaveDecision::Rejected => "Rejected; leave balance unchanged".to_string(),
        },
    };

    Ok(LeaveDecisionResult {
        request: decided,
        day_count,
        balance_deduction,
        audit_step,
    })
}

/// The leave balance before and after an approval, including the audit step.
#[derive(Debug, Clone)]
pub struct LeaveBalanceResult {
    /// The balance the deduction was applied to.
    pub previous_balance: u32,
    /// `max(0, previous_balance - day_count)`.
    pub new_balance: u32,
    /// The audit step recording the deduction.
    pub audit_step: AuditStep,
}

/// Deducts `day_count` from `previous_balance`, floored at zero.
///
/// Stores apply the same rule under their own lock when an approval is
/// committed; this function derives the figures and the audit step from the
/// balance the store reports back.
pub fn apply_leave_balance_deduction(
    previous_balance: u32,
    day_count: u32,
    step_number: u32,
) -> LeaveBalanceResult {
    let new_balance = previous_balance.saturating_sub(day_count);
    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_balance".to_string(),
        rule_name: "Leave Balance Deduction".to_string(),
        input: serde_json::json!({
            "previous_balance": previous_balance,
            "day_count": day_count
        }),
        output: serde_json::json!({
            "new_balance": new_balance
        }),
        reasoning: format!(
            "max(0, {} - {}) = {}",
            previous_balance, day_count, new_balance
        ),
    };

    LeaveBalanceResult {
        previous_balance,
        new_balance,
        audit_step,
    }
}
