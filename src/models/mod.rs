//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod category;
mod employee;
mod leave;
mod month;
mod piecework;
mod salary;

pub use attendance::Attendance;
pub use category::SurveyCategory;
pub use employee::{Employee, EmployeeSummary, EmployeeUpdate, Role, WithEmployee};
pub use leave::{LeaveDecision, LeaveDecisionOutcome, LeaveKind, LeaveRequest, LeaveStatus};
pub use month::{Month, inclusive_days};
pub use piecework::{
    CategoryStats, DailySubmissions, DashboardStats, PieceworkEntry, RejectionAdjustment,
    SurveyStats,
};
pub use salary::{
    AuditStep, AuditTrace, AuditWarning, CategoryBreakdown, SalaryCalculation, SalaryRecord,
};
