//! Rejected-piecework deduction.
//!
//! This module applies admin-recorded rejection adjustments for a month to a
//! piecework breakdown.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::RateTable;
use crate::error::EngineResult;
use crate::models::{AuditStep, CategoryBreakdown, Month, RejectionAdjustment, SurveyCategory};

/// The result of applying rejection adjustments, including the audit step.
#[derive(Debug, Clone)]
pub struct RejectionDeductionResult {
    /// The breakdown with rejected units and deductions filled in.
    pub breakdown: BTreeMap<SurveyCategory, CategoryBreakdown>,
    /// Sum of `rejected * rate` across categories.
    pub rejection_deduction: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies the adjustments recorded for `month` to `breakdown`.
///
/// Adjustments for other months are ignored. A matching adjustment sets the
/// category's rejected units and deduction; categories without one keep zero.
pub fn apply_rejection_deductions(
    mut breakdown: BTreeMap<SurveyCategory, CategoryBreakdown>,
    adjustments: &[RejectionAdjustment],
    month: Month,
    rates: &RateTable,
    step_number: u32,
) -> EngineResult<RejectionDeductionResult> {
    let mut applied = Vec::new();

    for adjustment in adjustments.iter().filter(|a| a.month == month) {
        let rate = rates.rate(adjustment.category)?;
        let line = breakdown
            .entry(adjustment.category)
            .or_insert_with(|| CategoryBreakdown::zeroed(rate));
        line.rejected = u64::from(adjustment.units_rejected);
        line.deduction = Decimal::from(adjustment.units_rejected) * line.rate;
        applied.push(serde_json::json!({
            "survey_type": adjustment.category.as_str(),
            "rejected": adjustment.units_rejected,
            "deduction": line.deduction.normalize().to_string()
        }));
    }

    let rejection_deduction: Decimal = breakdown.values().map(|line| line.deduction).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "rejection_deduction".to_string(),
        rule_name: "Rejected Survey Deduction".to_string(),
        input: serde_json::json!({
            "month": month.to_string(),
            "adjustments_considered": adjustments.len()
        }),
        output: serde_json::json!({
            "rejection_deduction": rejection_deduction.normalize().to_string(),
            "applied": applied
        }),
        reasoning: if applied.is_empty() {
            format!("No rejected surveys recorded for {}", month)
        } else {
            format!(
                "{} rejection adjustment(s) deduct ${}",
                applied.len(),
                rejection_deduction.normalize()
            )
        },
    };

    Ok(RejectionDeductionResult {
        breakdown,
        rejection_deduction,
        audit_step,
    })
}
