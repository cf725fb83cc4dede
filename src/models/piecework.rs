//! Piecework and rejection models.
//!
//! A [`PieceworkEntry`] is one day's submitted output for one category; a
//! [`RejectionAdjustment`] is the admin-recorded count of rejected units for
//! one category in one month. The per-category and dashboard totals built
//! from them live here too.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Month, SurveyCategory};

/// One day's completed units for one survey category.
///
/// At most one entry exists per `(user_id, date, category)`.
///
/// # Example
///
/// ```
/// use survey_payroll::models::{PieceworkEntry, SurveyCategory};
/// use chrono::NaiveDate;
///
/// let entry = PieceworkEntry {
///     id: 1,
///     user_id: 7,
///     date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
///     category: SurveyCategory::Yours,
///     units_completed: 10,
/// };
/// assert_eq!(entry.key(), (7, entry.date, SurveyCategory::Yours));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceworkEntry {
    /// Identifier assigned by the store.
    pub id: u64,
    /// The employee who did the work.
    pub user_id: u64,
    /// The day the work was submitted for.
    pub date: NaiveDate,
    /// The survey category.
    #[serde(rename = "survey_type")]
    pub category: SurveyCategory,
    /// Units completed that day.
    #[serde(rename = "completed")]
    pub units_completed: u32,
}

impl PieceworkEntry {
    /// The natural uniqueness key of the entry.
    pub fn key(&self) -> (u64, NaiveDate, SurveyCategory) {
        (self.user_id, self.date, self.category)
    }
}

/// Rejected units for one user, one category and one month.
///
/// At most one adjustment exists per `(user_id, month, category)`; recording
/// the same key again replaces the previous value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionAdjustment {
    /// The employee whose output was rejected.
    pub user_id: u64,
    /// The month the rejection applies to.
    pub month: Month,
    /// The survey category.
    #[serde(rename = "survey_type")]
    pub category: SurveyCategory,
    /// Units rejected.
    #[serde(rename = "rejected")]
    pub units_rejected: u32,
    /// The admin who recorded the adjustment.
    pub recorded_by: u64,
}

impl RejectionAdjustment {
    /// The natural uniqueness key of the adjustment.
    pub fn key(&self) -> (u64, Month, SurveyCategory) {
        (self.user_id, self.month, self.category)
    }
}

/// Monthly totals for one category across all employees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Units completed in the month.
    pub completed: u64,
    /// Units rejected for the month.
    pub rejected: u64,
}

/// Per-category totals for a month, always keyed by every category.
pub type SurveyStats = BTreeMap<SurveyCategory, CategoryStats>;

/// One employee's submission for each category on one day; `None` where
/// nothing was submitted.
pub type DailySubmissions = BTreeMap<SurveyCategory, Option<PieceworkEntry>>;

/// Headline figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// The month `survey_stats` covers.
    pub month: Month,
    /// The day the daily figures cover.
    pub date: NaiveDate,
    /// Users with the employee role; admins are not counted.
    pub employee_count: u64,
    /// Users with an attendance record for `date`.
    pub present_today: u64,
    /// Leave requests awaiting a decision.
    pub pending_leaves: u64,
    /// Units submitted for `date`, across users and categories.
    pub surveys_today: u64,
    /// Completed and rejected units per category for `month`.
    pub survey_stats: SurveyStats,
}
