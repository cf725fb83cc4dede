//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::SurveyCategory;

/// Metadata about the pay schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollMetadata {
    /// The human-readable name of the schedule.
    pub name: String,
    /// The version or effective date of the schedule.
    pub version: String,
}

/// How leave affects pay and balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LeavePolicy {
    /// Divisor applied to gross pay to price one leave day.
    ///
    /// This is a fixed business constant and is deliberately not the number
    /// of days in the month.
    #[serde(default = "default_deduction_divisor")]
    pub deduction_divisor: u32,
    /// Leave balance given to new employees.
    #[serde(default = "default_leave_balance")]
    pub default_balance: u32,
}

fn default_deduction_divisor() -> u32 {
    30
}

fn default_leave_balance() -> u32 {
    12
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            deduction_divisor: default_deduction_divisor(),
            default_balance: default_leave_balance(),
        }
    }
}

/// Structure of `payroll.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollSettings {
    /// Schedule metadata.
    pub payroll: PayrollMetadata,
    /// Leave policy.
    #[serde(default)]
    pub leave: LeavePolicy,
}

/// Structure of `rates.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesFile {
    /// Map of category to per-unit rate.
    pub rates: HashMap<SurveyCategory, Decimal>,
}

/// The per-unit rate of every survey category.
///
/// A `RateTable` always holds a positive rate for every category; the
/// constructor rejects anything else.
///
/// # Example
///
/// ```
/// use survey_payroll::config::RateTable;
/// use survey_payroll::models::SurveyCategory;
/// use rust_decimal::Decimal;
///
/// let rates = RateTable::standard();
/// assert_eq!(rates.rate(SurveyCategory::Yours).unwrap(), Decimal::from(27));
/// assert_eq!(rates.rate(SurveyCategory::Dynata).unwrap(), Decimal::from(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<SurveyCategory, Decimal>,
}

impl RateTable {
    /// Builds a rate table, validating that every category has a positive rate.
    pub fn new<I>(rates: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (SurveyCategory, Decimal)>,
    {
        let rates: BTreeMap<SurveyCategory, Decimal> = rates.into_iter().collect();

        for category in SurveyCategory::ALL {
            match rates.get(&category) {
                None => return Err(EngineError::RateNotFound { category }),
                Some(rate) if *rate <= Decimal::ZERO => {
                    return Err(EngineError::invalid_input(
                        format!("rates.{}", category),
                        format!("rate must be positive, got {}", rate),
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(Self { rates })
    }

    /// The standard schedule: yours 27, yoursinternational 25, ssi 25, dynata 20.
    pub fn standard() -> Self {
        Self {
            rates: BTreeMap::from([
                (SurveyCategory::Yours, Decimal::from(27)),
                (SurveyCategory::YoursInternational, Decimal::from(25)),
                (SurveyCategory::Ssi, Decimal::from(25)),
                (SurveyCategory::Dynata, Decimal::from(20)),
            ]),
        }
    }

    /// The per-unit rate for a category.
    pub fn rate(&self, category: SurveyCategory) -> EngineResult<Decimal> {
        self.rates
            .get(&category)
            .copied()
            .ok_or(EngineError::RateNotFound { category })
    }

    /// Iterates over `(category, rate)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (SurveyCategory, Decimal)> + '_ {
        self.rates.iter().map(|(c, r)| (*c, *r))
    }
}

/// The complete payroll configuration.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    metadata: PayrollMetadata,
    rates: RateTable,
    leave: LeavePolicy,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(metadata: PayrollMetadata, rates: RateTable, leave: LeavePolicy) -> Self {
        Self {
            metadata,
            rates,
            leave,
        }
    }

    /// The standard schedule with the default leave policy.
    pub fn standard() -> Self {
        Self::new(
            PayrollMetadata {
                name: "Standard survey piecework schedule".to_string(),
                version: "standard".to_string(),
            },
            RateTable::standard(),
            LeavePolicy::default(),
        )
    }

    /// Returns the schedule metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        &self.metadata
    }

    /// Returns the rate table.
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Returns the leave policy.
    pub fn leave(&self) -> &LeavePolicy {
        &self.leave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_table_requires_every_category() {
        let result = RateTable::new([
            (SurveyCategory::Yours, Decimal::from(27)),
            (SurveyCategory::Ssi, Decimal::from(25)),
            (SurveyCategory::Dynata, Decimal::from(20)),
        ]);
        match result {
            Err(EngineError::RateNotFound { category }) => {
                assert_eq!(category, SurveyCategory::YoursInternational)
            }
            other => panic!("Expected RateNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_table_rejects_non_positive_rate() {
        let result = RateTable::new([
            (SurveyCategory::Yours, Decimal::from(27)),
            (SurveyCategory::YoursInternational, Decimal::from(25)),
            (SurveyCategory::Ssi, Decimal::ZERO),
            (SurveyCategory::Dynata, Decimal::from(20)),
        ]);
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_alternate_schedule() {
        let rates = RateTable::new(SurveyCategory::ALL.map(|c| (c, Decimal::from(10)))).unwrap();
        for category in SurveyCategory::ALL {
            assert_eq!(rates.rate(category).unwrap(), Decimal::from(10));
        }
    }

    #[test]
    fn test_leave_policy_defaults() {
        let settings: PayrollSettings = serde_yaml::from_str(
            "payroll:\n  name: Test\n  version: \"1\"\n",
        )
        .unwrap();
        assert_eq!(settings.leave.deduction_divisor, 30);
        assert_eq!(settings.leave.default_balance, 12);
    }
}
