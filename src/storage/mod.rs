//! Data-access port for the payroll engine.
//!
//! The engine codes against the [`PayrollStore`] trait and never against a
//! concrete database. Implementations must enforce the natural uniqueness
//! keys themselves: duplicate piecework or attendance inserts fail with
//! [`EngineError::Conflict`](crate::error::EngineError::Conflict), while
//! rejection adjustments and salary records are upserted atomically.
//!
//! [`InMemoryStore`] is the implementation used by the binary and the tests.

mod in_memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{
    Attendance, Employee, EmployeeUpdate, LeaveRequest, Month, PieceworkEntry,
    RejectionAdjustment, SalaryRecord,
};

pub use in_memory::InMemoryStore;

/// Everything the payroll engine needs from persistent storage.
///
/// Insert methods ignore the `id` of their argument and return the stored
/// record with the identifier the store assigned.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Looks up a user by id.
    async fn find_employee(&self, id: u64) -> EngineResult<Option<Employee>>;

    /// Inserts a user. A duplicate username is a conflict.
    async fn insert_employee(&self, employee: Employee) -> EngineResult<Employee>;

    /// All users, ordered by id.
    async fn list_employees(&self) -> EngineResult<Vec<Employee>>;

    /// Applies `update` to a stored user and returns the result.
    ///
    /// A username already used by another user is a conflict.
    async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> EngineResult<Employee>;

    /// Removes a user and returns the removed record.
    async fn delete_employee(&self, id: u64) -> EngineResult<Employee>;

    /// Takes `days` off a user's leave balance, floored at zero, and returns
    /// the balance the deduction was applied to.
    ///
    /// The read and the write are one atomic step, so concurrent approvals
    /// for the same user each deduct their own days.
    async fn deduct_leave_balance(&self, user_id: u64, days: u32) -> EngineResult<u32>;

    /// Inserts a piecework entry. A duplicate `(user, date, category)` is a conflict.
    async fn insert_piecework(&self, entry: PieceworkEntry) -> EngineResult<PieceworkEntry>;

    /// All piecework entries of a user dated within a month.
    async fn list_piecework_by_user_and_month(
        &self,
        user_id: u64,
        month: Month,
    ) -> EngineResult<Vec<PieceworkEntry>>;

    /// All piecework entries dated within a month, across users.
    async fn list_piecework_by_month(&self, month: Month) -> EngineResult<Vec<PieceworkEntry>>;

    /// All piecework entries of a user, oldest first.
    async fn list_piecework_by_user(&self, user_id: u64) -> EngineResult<Vec<PieceworkEntry>>;

    /// All piecework entries for one day, across users.
    async fn list_piecework_by_date(&self, date: NaiveDate) -> EngineResult<Vec<PieceworkEntry>>;

    /// Inserts or replaces the adjustment for `(user, month, category)`.
    async fn upsert_rejection(
        &self,
        adjustment: RejectionAdjustment,
    ) -> EngineResult<RejectionAdjustment>;

    /// All rejection adjustments of a user, for any month.
    async fn list_rejections_by_user(&self, user_id: u64)
    -> EngineResult<Vec<RejectionAdjustment>>;

    /// All rejection adjustments for a month, across users.
    async fn list_rejections_by_month(&self, month: Month)
    -> EngineResult<Vec<RejectionAdjustment>>;

    /// Inserts a new leave request.
    async fn insert_leave_request(&self, request: LeaveRequest) -> EngineResult<LeaveRequest>;

    /// Looks up a leave request by id.
    async fn find_leave_request(&self, id: u64) -> EngineResult<Option<LeaveRequest>>;

    /// Stores a decided leave request.
    ///
    /// The stored request must still be pending; otherwise the call fails with
    /// [`EngineError::LeaveAlreadyDecided`](crate::error::EngineError::LeaveAlreadyDecided)
    /// and nothing is written.
    async fn commit_leave_decision(&self, request: LeaveRequest) -> EngineResult<LeaveRequest>;

    /// All approved leave requests of a user, for any dates.
    async fn list_approved_leave_by_user(&self, user_id: u64) -> EngineResult<Vec<LeaveRequest>>;

    /// All leave requests of a user.
    async fn list_leave_by_user(&self, user_id: u64) -> EngineResult<Vec<LeaveRequest>>;

    /// All pending leave requests.
    async fn list_pending_leave(&self) -> EngineResult<Vec<LeaveRequest>>;

    /// Inserts or replaces the salary record for `(user, month)`.
    async fn upsert_salary_record(&self, record: SalaryRecord) -> EngineResult<SalaryRecord>;

    /// Looks up the salary record for `(user, month)`.
    async fn find_salary_record(
        &self,
        user_id: u64,
        month: Month,
    ) -> EngineResult<Option<SalaryRecord>>;

    /// All salary records for a month.
    async fn list_salary_records_by_month(&self, month: Month) -> EngineResult<Vec<SalaryRecord>>;

    /// Looks up the attendance for `(user, date)`.
    async fn find_attendance(&self, user_id: u64, date: NaiveDate)
    -> EngineResult<Option<Attendance>>;

    /// Inserts an attendance record. A duplicate `(user, date)` is a conflict.
    async fn insert_attendance(&self, attendance: Attendance) -> EngineResult<Attendance>;

    /// Replaces an existing attendance record.
    async fn update_attendance(&self, attendance: Attendance) -> EngineResult<Attendance>;

    /// All attendance records of a user, oldest first.
    async fn list_attendance_by_user(&self, user_id: u64) -> EngineResult<Vec<Attendance>>;

    /// All attendance records for one day, across users.
    async fn list_attendance_by_date(&self, date: NaiveDate) -> EngineResult<Vec<Attendance>>;
}
