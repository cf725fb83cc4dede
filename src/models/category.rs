//! Survey category model.
//!
//! This module defines the fixed set of piecework categories, one per
//! external survey provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A piecework category. Each category is paid at its own per-unit rate.
///
/// # Example
///
/// ```
/// use survey_payroll::models::SurveyCategory;
///
/// let category: SurveyCategory = "yoursinternational".parse().unwrap();
/// assert_eq!(category, SurveyCategory::YoursInternational);
/// assert_eq!(category.to_string(), "yoursinternational");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyCategory {
    /// Yours surveys.
    Yours,
    /// Yours International surveys.
    YoursInternational,
    /// SSI surveys.
    Ssi,
    /// Dynata surveys.
    Dynata,
}

impl SurveyCategory {
    /// Every category, in breakdown order.
    pub const ALL: [SurveyCategory; 4] = [
        SurveyCategory::Yours,
        SurveyCategory::YoursInternational,
        SurveyCategory::Ssi,
        SurveyCategory::Dynata,
    ];

    /// The wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyCategory::Yours => "yours",
            SurveyCategory::YoursInternational => "yoursinternational",
            SurveyCategory::Ssi => "ssi",
            SurveyCategory::Dynata => "dynata",
        }
    }
}

impl fmt::Display for SurveyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurveyCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SurveyCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                EngineError::invalid_input("survey_type", format!("unknown survey category '{}'", s))
            })
    }
}
