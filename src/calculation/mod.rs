//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions behind a monthly
//! salary: gross pay from piecework, rejected-survey deductions, approved
//! leave-day counting, the leave deduction, and the leave approval rule that
//! adjusts an employee's leave balance. Every function returns its result
//! together with an [`AuditStep`](crate::models::AuditStep).

mod leave_approval;
mod leave_days;
mod leave_deduction;
mod piecework_pay;
mod rejection_deduction;
mod salary;

pub use leave_approval::{
    LeaveBalanceResult, LeaveDecisionResult, apply_leave_balance_deduction, decide_leave,
};
pub use leave_days::{LeaveDayCountResult, count_leave_days_in_month};
pub use leave_deduction::{LeaveDeductionResult, calculate_leave_deduction};
pub use piecework_pay::{PieceworkPayResult, calculate_piecework_pay, empty_breakdown};
pub use rejection_deduction::{RejectionDeductionResult, apply_rejection_deductions};
pub use salary::{NEGATIVE_FINAL_PAY, SalaryBreakdown, SalaryInputs, calculate_salary_breakdown};
