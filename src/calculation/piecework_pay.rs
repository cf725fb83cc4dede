//! Gross piecework pay calculation.
//!
//! This module aggregates a month of submitted piecework into a per-category
//! breakdown and the gross pay total.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::RateTable;
use crate::error::EngineResult;
use crate::models::{AuditStep, CategoryBreakdown, Month, PieceworkEntry, SurveyCategory};

/// The result of aggregating piecework, including the audit step.
#[derive(Debug, Clone)]
pub struct PieceworkPayResult {
    /// A line for every category, rejected fields still zero.
    pub breakdown: BTreeMap<SurveyCategory, CategoryBreakdown>,
    /// Sum of `completed * rate` across categories.
    pub gross_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Builds a zeroed breakdown line for every category at its configured rate.
pub fn empty_breakdown(rates: &RateTable) -> BTreeMap<SurveyCategory, CategoryBreakdown> {
    rates
        .iter()
        .map(|(category, rate)| (category, CategoryBreakdown::zeroed(rate)))
        .collect()
}

/// Aggregates the piecework entries dated within `month`.
///
/// Every category gets a breakdown line, including categories with no
/// entries. Entries dated outside the month are ignored.
///
/// # Errors
///
/// Returns [`EngineError::RateNotFound`](crate::error::EngineError::RateNotFound)
/// if an entry's category has no rate.
///
/// # Examples
///
/// ```
/// use survey_payroll::calculation::calculate_piecework_pay;
/// use survey_payroll::config::RateTable;
/// use survey_payroll::models::{Month, PieceworkEntry, SurveyCategory};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let entry = PieceworkEntry {
///     id: 1,
///     user_id: 7,
///     date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
///     category: SurveyCategory::Yours,
///     units_completed: 10,
/// };
/// let month: Month = "2024-01".parse().unwrap();
///
/// let result = calculate_piecework_pay(&[entry], month, &RateTable::standard(), 1).unwrap();
/// assert_eq!(result.gross_pay, Decimal::from(270));
/// ```
pub fn calculate_piecework_pay(
    entries: &[PieceworkEntry],
    month: Month,
    rates: &RateTable,
    step_number: u32,
) -> EngineResult<PieceworkPayResult> {
    let mut breakdown = empty_breakdown(rates);
    let mut gross_pay = Decimal::ZERO;
    let mut entries_counted = 0usize;

    for entry in entries.iter().filter(|e| month.contains(e.date)) {
        let rate = rates.rate(entry.category)?;
        let amount = Decimal::from(entry.units_completed) * rate;
        let line = breakdown
            .entry(entry.category)
            .or_insert_with(|| CategoryBreakdown::zeroed(rate));
        line.completed += u64::from(entry.units_completed);
        line.amount += amount;
        gross_pay += amount;
        entries_counted += 1;
    }

    let per_category: serde_json::Map<String, serde_json::Value> = breakdown
        .iter()
        .map(|(category, line)| {
            (
                category.to_string(),
                serde_json::json!({
                    "completed": line.completed,
                    "rate": line.rate.normalize().to_string(),
                    "amount": line.amount.normalize().to_string()
                }),
            )
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "piecework_pay".to_string(),
        rule_name: "Piecework Gross Pay".to_string(),
        input: serde_json::json!({
            "month": month.to_string(),
            "entries": entries_counted
        }),
        output: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "categories": per_category
        }),
        reasoning: format!(
            "{} piecework entr{} in {} pay ${}",
            entries_counted,
            if entries_counted == 1 { "y" } else { "ies" },
            month,
            gross_pay.normalize()
        ),
    };

    Ok(PieceworkPayResult {
        breakdown,
        gross_pay,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
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

    fn january() -> Month {
        "2024-01".parse().unwrap()
    }

    #[test]
    fn test_no_entries_gives_zeroed_breakdown_for_every_category() {
        let result = calculate_piecework_pay(&[], january(), &RateTable::standard(), 1).unwrap();
        assert_eq!(result.gross_pay, Decimal::ZERO);
        assert_eq!(result.breakdown.len(), SurveyCategory::ALL.len());
        for line in result.breakdown.values() {
            assert_eq!(line.completed, 0);
            assert_eq!(line.amount, Decimal::ZERO);
        }
        assert_eq!(
            result.breakdown[&SurveyCategory::Yours].rate,
            Decimal::from(27)
        );
    }

    #[test]
    fn test_ten_units_at_27() {
        let entries = [entry(date(2024, 1, 10), SurveyCategory::Yours, 10)];
        let result = calculate_piecework_pay(&entries, january(), &RateTable::standard(), 1).unwrap();

        let line = &result.breakdown[&SurveyCategory::Yours];
        assert_eq!(line.completed, 10);
        assert_eq!(line.amount, Decimal::from(270));
        assert_eq!(result.gross_pay, Decimal::from(270));
    }

    #[test]
    fn test_multiple_days_and_categories() {
        let entries = [
            entry(date(2024, 1, 2), SurveyCategory::Ssi, 4),
            entry(date(2024, 1, 3), SurveyCategory::Ssi, 6),
            entry(date(2024, 1, 3), SurveyCategory::Dynata, 5),
        ];
        let result = calculate_piecework_pay(&entries, january(), &RateTable::standard(), 1).unwrap();

        assert_eq!(result.breakdown[&SurveyCategory::Ssi].completed, 10);
        assert_eq!(result.breakdown[&SurveyCategory::Ssi].amount, Decimal::from(250));
        assert_eq!(result.breakdown[&SurveyCategory::Dynata].amount, Decimal::from(100));
        assert_eq!(result.gross_pay, Decimal::from(350));
    }

    #[test]
    fn test_entries_outside_month_ignored() {
        let entries = [
            entry(date(2023, 12, 31), SurveyCategory::Yours, 10),
            entry(date(2024, 2, 1), SurveyCategory::Yours, 10),
        ];
        let result = calculate_piecework_pay(&entries, january(), &RateTable::standard(), 1).unwrap();
        assert_eq!(result.gross_pay, Decimal::ZERO);
    }

    #[test]
    fn test_alternate_rate_schedule() {
        let rates = RateTable::new(SurveyCategory::ALL.map(|c| (c, Decimal::new(125, 1)))).unwrap();
        let entries = [entry(date(2024, 1, 5), SurveyCategory::Dynata, 4)];
        let result = calculate_piecework_pay(&entries, january(), &rates, 1).unwrap();
        assert_eq!(result.gross_pay, Decimal::from(50));
    }

    #[test]
    fn test_monthly_total_exceeding_u32_is_kept_exact() {
        let entries = [
            entry(date(2024, 1, 2), SurveyCategory::Yours, 3_000_000_000),
            entry(date(2024, 1, 3), SurveyCategory::Yours, 3_000_000_000),
        ];
        let result = calculate_piecework_pay(&entries, january(), &RateTable::standard(), 1).unwrap();

        let line = &result.breakdown[&SurveyCategory::Yours];
        assert_eq!(line.completed, 6_000_000_000);
        assert_eq!(line.amount, Decimal::from(162_000_000_000u64));
        assert_eq!(result.gross_pay, Decimal::from(162_000_000_000u64));
        assert_eq!(
            result.audit_step.output["categories"]["yours"]["completed"],
            6_000_000_000u64
        );
    }

    #[test]
    fn test_audit_step_reports_gross_pay() {
        let entries = [entry(date(2024, 1, 10), SurveyCategory::Yours, 10)];
        let result = calculate_piecework_pay(&entries, january(), &RateTable::standard(), 2).unwrap();
        assert_eq!(result.audit_step.step_number, 2);
        assert_eq!(result.audit_step.output["gross_pay"], "270");
        assert_eq!(result.audit_step.output["categories"]["yours"]["completed"], 10);
    }
}
