//! Monthly salary derivation.
//!
//! This module chains the piecework, rejection and leave calculations into
//! one salary breakdown for a single employee and month. It performs no I/O:
//! the caller fetches the rows and persists the resulting record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::PayrollConfig;
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditWarning, CategoryBreakdown, LeaveRequest, Month, PieceworkEntry,
    RejectionAdjustment, SalaryRecord, SurveyCategory,
};

use super::{
    apply_rejection_deductions, calculate_leave_deduction, calculate_piecework_pay,
    count_leave_days_in_month,
};

/// Warning code emitted when deductions exceed gross pay.
pub const NEGATIVE_FINAL_PAY: &str = "NEGATIVE_FINAL_PAY";

/// The rows a salary calculation works from.
#[derive(Debug, Clone, Copy)]
pub struct SalaryInputs<'a> {
    /// The month being paid.
    pub month: Month,
    /// The employee's piecework entries for the month.
    pub piecework: &'a [PieceworkEntry],
    /// The employee's rejection adjustments, for any month.
    pub rejections: &'a [RejectionAdjustment],
    /// The employee's approved leave requests, for any dates.
    pub approved_leave: &'a [LeaveRequest],
}

/// The derived salary figures with the audit steps that produced them.
#[derive(Debug, Clone)]
pub struct SalaryBreakdown {
    /// The month the figures cover.
    pub month: Month,
    /// Figures for every category.
    pub breakdown: BTreeMap<SurveyCategory, CategoryBreakdown>,
    /// Sum of completed units times rate.
    pub gross_pay: Decimal,
    /// Sum of rejected units times rate.
    pub rejection_deduction: Decimal,
    /// Approved leave days inside the month.
    pub leave_days: u32,
    /// Deduction for the leave days.
    pub leave_deduction: Decimal,
    /// `gross_pay - (rejection_deduction + leave_deduction)`, unfloored.
    pub final_pay: Decimal,
    /// Audit steps in calculation order.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings about unusual but valid outcomes.
    pub warnings: Vec<AuditWarning>,
}

impl SalaryBreakdown {
    /// Turns the figures into the record persisted for `user_id`.
    pub fn to_record(
        &self,
        user_id: u64,
        computed_by: u64,
        computed_at: DateTime<Utc>,
    ) -> SalaryRecord {
        SalaryRecord {
            user_id,
            month: self.month,
            gross_pay: self.gross_pay,
            rejection_deduction: self.rejection_deduction,
            leave_deduction: self.leave_deduction,
            final_pay: self.final_pay,
            breakdown: self.breakdown.clone(),
            computed_by,
            computed_at,
        }
    }
}

/// Derives the monthly salary from piecework, rejections and approved leave.
///
/// The steps run in a fixed order: gross pay from piecework, rejection
/// deductions for the month, approved leave days, leave deduction, and final
/// pay. A negative final pay is a valid result and is flagged with a
/// [`NEGATIVE_FINAL_PAY`] warning.
///
/// # Examples
///
/// ```
/// use survey_payroll::calculation::{calculate_salary_breakdown, SalaryInputs};
/// use survey_payroll::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let inputs = SalaryInputs {
///     month: "2024-01".parse().unwrap(),
///     piecework: &[],
///     rejections: &[],
///     approved_leave: &[],
/// };
/// let result = calculate_salary_breakdown(inputs, &PayrollConfig::standard()).unwrap();
/// assert_eq!(result.final_pay, Decimal::ZERO);
/// assert_eq!(result.breakdown.len(), 4);
/// ```
pub fn calculate_salary_breakdown(
    inputs: SalaryInputs<'_>,
    config: &PayrollConfig,
) -> EngineResult<SalaryBreakdown> {
    let month = inputs.month;
    let rates = config.rates();
    let mut audit_steps = Vec::with_capacity(5);
    let mut warnings = Vec::new();

    let piecework = calculate_piecework_pay(inputs.piecework, month, rates, 1)?;
    audit_steps.push(piecework.audit_step);

    let rejections =
        apply_rejection_deductions(piecework.breakdown, inputs.rejections, month, rates, 2)?;
    audit_steps.push(rejections.audit_step);

    let leave = count_leave_days_in_month(inputs.approved_leave, month, 3);
    audit_steps.push(leave.audit_step);

    let leave_deduction =
        calculate_leave_deduction(piecework.gross_pay, leave.leave_days, config.leave(), 4)?;
    audit_steps.push(leave_deduction.audit_step);

    let gross_pay = piecework.gross_pay;
    let rejection_deduction = rejections.rejection_deduction;
    let total_deductions = rejection_deduction + leave_deduction.leave_deduction;
    let final_pay = gross_pay - total_deductions;

    audit_steps.push(AuditStep {
        step_number: 5,
        rule_id: "final_pay".to_string(),
        rule_name: "Final Pay".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "rejection_deduction": rejection_deduction.normalize().to_string(),
            "leave_deduction": leave_deduction.leave_deduction.normalize().to_string()
        }),
        output: serde_json::json!({
            "final_pay": final_pay.normalize().to_string()
        }),
        reasoning: format!(
            "${} - (${} + ${}) = ${}",
            gross_pay.normalize(),
            rejection_deduction.normalize(),
            leave_deduction.leave_deduction.normalize(),
            final_pay.normalize()
        ),
    });

    if final_pay < Decimal::ZERO {
        warnings.push(AuditWarning {
            code: NEGATIVE_FINAL_PAY.to_string(),
            message: format!(
                "Deductions of ${} exceed gross pay of ${} for {}",
                total_deductions.normalize(),
                gross_pay.normalize(),
                month
            ),
            severity: "medium".to_string(),
        });
    }

    Ok(SalaryBreakdown {
        month,
        breakdown: rejections.breakdown,
        gross_pay,
        rejection_deduction,
        leave_days: leave.leave_days,
        leave_deduction: leave_deduction.leave_deduction,
        final_pay,
        audit_steps,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeaveKind, LeaveStatus};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn entry(day: NaiveDate, category: SurveyCategory, units: u32) -> PieceworkEntry {
        PieceworkEntry {
            id: 0,
            user_id: 7,
            date: day,
            category,
            units_completed: units,
        }
    }

    fn rejection(m: &str, category: SurveyCategory, units: u32) -> RejectionAdjustment {
        RejectionAdjustment {
            user_id: 7,
            month: month(m),
            category,
            units_rejected: units,
            recorded_by: 1,
        }
    }

    fn approved_leave(start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            user_id: 7,
            leave_kind: LeaveKind::Medical,
            start_date: start,
            end_date: end,
            reason: "flu".to_string(),
            status: LeaveStatus::Approved,
            decided_by: Some(1),
            created_at: Utc::now(),
        }
    }

    fn flat_config(rate: i64) -> PayrollConfig {
        let rates = crate::config::RateTable::new(
            SurveyCategory::ALL.map(|c| (c, Decimal::from(rate))),
        )
        .unwrap();
        PayrollConfig::new(
            PayrollConfig::standard().metadata().clone(),
            rates,
            Default::default(),
        )
    }

    #[test]
    fn test_empty_month_is_all_zero() {
        let inputs = SalaryInputs {
            month: month("2024-01"),
            piecework: &[],
            rejections: &[],
            approved_leave: &[],
        };
        let result = calculate_salary_breakdown(inputs, &PayrollConfig::standard()).unwrap();

        assert_eq!(result.gross_pay, Decimal::ZERO);
        assert_eq!(result.rejection_deduction, Decimal::ZERO);
        assert_eq!(result.leave_deduction, Decimal::ZERO);
        assert_eq!(result.final_pay, Decimal::ZERO);
        assert_eq!(result.leave_days, 0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_piecework_and_rejection_combine() {
        let piecework = [entry(date(2024, 1, 10), SurveyCategory::Yours, 10)];
        let rejections = [rejection("2024-01", SurveyCategory::Yours, 3)];
        let inputs = SalaryInputs {
            month: month("2024-01"),
            piecework: &piecework,
            rejections: &rejections,
            approved_leave: &[],
        };
        let result = calculate_salary_breakdown(inputs, &PayrollConfig::standard()).unwrap();

        let line = &result.breakdown[&SurveyCategory::Yours];
        assert_eq!(line.amount, Decimal::from(270));
        assert_eq!(line.deduction, Decimal::from(81));
        assert_eq!(result.gross_pay, Decimal::from(270));
        assert_eq!(result.rejection_deduction, Decimal::from(81));
        assert_eq!(result.final_pay, Decimal::from(189));
    }

    #[test]
    fn test_leave_deduction_on_3000_gross() {
        // 150 units at 20 = 3000
        let piecework = [entry(date(2024, 1, 3), SurveyCategory::Dynata, 150)];
        let leave = [approved_leave(date(2024, 1, 15), date(2024, 1, 16))];
        let inputs = SalaryInputs {
            month: month("2024-01"),
            piecework: &piecework,
            rejections: &[],
            approved_leave: &leave,
        };
        let result = calculate_salary_breakdown(inputs, &PayrollConfig::standard()).unwrap();

        assert_eq!(result.gross_pay, Decimal::from(3000));
        assert_eq!(result.leave_days, 2);
        assert_eq!(result.leave_deduction, Decimal::from(200));
        assert_eq!(result.final_pay, Decimal::from(2800));
    }

    #[test]
    fn test_negative_final_pay_is_accepted_with_warning() {
        // gross 100, rejection 50, 30 leave days -> leave deduction 100
        let piecework = [entry(date(2023, 4, 3), SurveyCategory::Ssi, 10)];
        let rejections = [rejection("2023-04", SurveyCategory::Ssi, 5)];
        let leave = [approved_leave(date(2023, 4, 1), date(2023, 4, 30))];
        let inputs = SalaryInputs {
            month: month("2023-04"),
            piecework: &piecework,
            rejections: &rejections,
            approved_leave: &leave,
        };
        let result = calculate_salary_breakdown(inputs, &flat_config(10)).unwrap();

        assert_eq!(result.gross_pay, Decimal::from(100));
        assert_eq!(result.rejection_deduction, Decimal::from(50));
        assert_eq!(result.leave_deduction, Decimal::from(100));
        assert_eq!(result.final_pay, Decimal::from(-50));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, NEGATIVE_FINAL_PAY);
    }

    #[test]
    fn test_audit_steps_in_order() {
        let inputs = SalaryInputs {
            month: month("2024-01"),
            piecework: &[],
            rejections: &[],
            approved_leave: &[],
        };
        let result = calculate_salary_breakdown(inputs, &PayrollConfig::standard()).unwrap();
        let rule_ids: Vec<&str> = result.audit_steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            rule_ids,
            vec![
                "piecework_pay",
                "rejection_deduction",
                "leave_days",
                "leave_deduction",
                "final_pay"
            ]
        );
        for (i, step) in result.audit_steps.iter().enumerate() {
            assert_eq!(step.step_number, (i + 1) as u32);
        }
    }

    #[test]
    fn test_same_inputs_give_same_record() {
        let piecework = [entry(date(2024, 1, 10), SurveyCategory::Yours, 10)];
        let inputs = SalaryInputs {
            month: month("2024-01"),
            piecework: &piecework,
            rejections: &[],
            approved_leave: &[],
        };
        let now = Utc::now();
        let first = calculate_salary_breakdown(inputs, &PayrollConfig::standard())
            .unwrap()
            .to_record(7, 1, now);
        let second = calculate_salary_breakdown(inputs, &PayrollConfig::standard())
            .unwrap()
            .to_record(7, 1, now);
        assert_eq!(first, second);
    }
}
