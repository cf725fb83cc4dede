//! Attendance model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One employee's check-in and check-out for one day.
///
/// At most one record exists per `(user_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Identifier assigned by the store.
    pub id: u64,
    /// The employee.
    pub user_id: u64,
    /// The working day.
    pub date: NaiveDate,
    /// When the employee checked in.
    pub check_in: DateTime<Utc>,
    /// When the employee checked out, if they have.
    pub check_out: Option<DateTime<Utc>>,
}

impl Attendance {
    /// Returns true once the employee has checked out.
    pub fn is_complete(&self) -> bool {
        self.check_out.is_some()
    }
}
