//! Leave deduction calculation.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// The result of pricing leave days, including the audit step.
#[derive(Debug, Clone)]
pub struct LeaveDeductionResult {
    /// The amount deducted for leave, a whole currency unit.
    pub leave_deduction: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes `round(gross_pay / divisor * leave_days)`.
///
/// The divisor comes from the leave policy and is a fixed business constant
/// (30 in the standard schedule), not the length of the month. The result is
/// rounded half away from zero to a whole currency unit.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the divisor is zero or the
/// arithmetic overflows.
///
/// # Examples
///
/// ```
/// use survey_payroll::calculation::calculate_leave_deduction;
/// use survey_payroll::config::LeavePolicy;
/// use rust_decimal::Decimal;
///
/// let result = calculate_leave_deduction(Decimal::from(3000), 2, &LeavePolicy::default(), 1).unwrap();
/// assert_eq!(result.leave_deduction, Decimal::from(200));
/// ```
pub fn calculate_leave_deduction(
    gross_pay: Decimal,
    leave_days: u32,
    policy: &LeavePolicy,
    step_number: u32,
) -> EngineResult<LeaveDeductionResult> {
    let divisor = Decimal::from(policy.deduction_divisor);

    let leave_deduction = gross_pay
        .checked_mul(Decimal::from(leave_days))
        .and_then(|scaled| scaled.checked_div(divisor))
        .map(|raw| raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "cannot price {} leave day(s) on gross pay {} with divisor {}",
                leave_days, gross_pay, divisor
            ),
        })?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_deduction".to_string(),
        rule_name: "Leave Deduction".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "leave_days": leave_days,
            "divisor": policy.deduction_divisor
        }),
        output: serde_json::json!({
            "leave_deduction": leave_deduction.normalize().to_string()
        }),
        reasoning: format!(
            "round(${} / {} x {}) = ${}",
            gross_pay.normalize(),
            policy.deduction_divisor,
            leave_days,
            leave_deduction.normalize()
        ),
    };

    Ok(LeaveDeductionResult {
        leave_deduction,
        audit_step,
    })
}
