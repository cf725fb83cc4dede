//! Salary result models for the payroll engine.
//!
//! This module contains the persisted [`SalaryRecord`], its per-category
//! [`CategoryBreakdown`], and the [`SalaryCalculation`] envelope returned to
//! callers together with an audit trace of every calculation step.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Month, SurveyCategory};

/// Pay figures for one survey category within a salary record.
///
/// # Example
///
/// ```
/// use survey_payroll::models::CategoryBreakdown;
/// use rust_decimal::Decimal;
///
/// let line = CategoryBreakdown::zeroed(Decimal::from(27));
/// assert_eq!(line.completed, 0);
/// assert_eq!(line.amount, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// Units completed in the month.
    pub completed: u64,
    /// The per-unit rate applied.
    pub rate: Decimal,
    /// `completed * rate`.
    pub amount: Decimal,
    /// Units rejected for the month.
    pub rejected: u64,
    /// `rejected * rate`.
    pub deduction: Decimal,
}

impl CategoryBreakdown {
    /// A breakdown line with no units at the given rate.
    pub fn zeroed(rate: Decimal) -> Self {
        Self {
            completed: 0,
            rate,
            amount: Decimal::ZERO,
            rejected: 0,
            deduction: Decimal::ZERO,
        }
    }
}

/// The persisted monthly salary for one employee.
///
/// At most one record exists per `(user_id, month)`; recalculating replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// The employee the salary is for.
    pub user_id: u64,
    /// The month the salary covers.
    pub month: Month,
    /// Sum of completed units times rate across categories.
    pub gross_pay: Decimal,
    /// Sum of rejected units times rate across categories.
    pub rejection_deduction: Decimal,
    /// Deduction for approved leave days.
    pub leave_deduction: Decimal,
    /// `gross_pay - (rejection_deduction + leave_deduction)`; may be negative.
    pub final_pay: Decimal,
    /// Figures for every category.
    pub breakdown: BTreeMap<SurveyCategory, CategoryBreakdown>,
    /// The admin who ran the calculation.
    pub computed_by: u64,
    /// When the calculation ran.
    pub computed_at: DateTime<Utc>,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag unusual outcomes that are still valid results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The result of running the salary calculation for one employee and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryCalculation {
    /// Unique identifier for this calculation run.
    pub calculation_id: Uuid,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Approved leave days counted in the month.
    pub leave_days: u32,
    /// The record as persisted.
    pub salary: SalaryRecord,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
