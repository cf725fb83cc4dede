// In-memory implementation of the payroll store.
//
// Each table is a map keyed by the record's natural key behind its own
// RwLock, so every uniqueness check and the write that follows it happen
// under the same write guard.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Attendance, Employee, EmployeeUpdate, LeaveRequest, LeaveStatus, Month, PieceworkEntry,
    RejectionAdjustment, SalaryRecord, SurveyCategory,
};

use super::PayrollStore;

/// A [`PayrollStore`] backed by process memory.
///
/// The store can be switched offline, after which every call fails with a
/// storage error; tests use this to exercise error propagation.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    employees: RwLock<BTreeMap<u64, Employee>>,
    piecework: RwLock<BTreeMap<(u64, NaiveDate, SurveyCategory), PieceworkEntry>>,
    rejections: RwLock<BTreeMap<(u64, Month, SurveyCategory), RejectionAdjustment>>,
    leave: RwLock<BTreeMap<u64, LeaveRequest>>,
    salaries: RwLock<BTreeMap<(u64, Month), SalaryRecord>>,
    attendance: RwLock<BTreeMap<(u64, NaiveDate), Attendance>>,
    sequence: AtomicU64,
    offline: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the store offline (or back online).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn ensure_online(&self) -> EngineResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(EngineError::Storage {
                message: "in-memory store is offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PayrollStore for InMemoryStore {
    async fn find_employee(&self, id: u64) -> EngineResult<Option<Employee>> {
        self.ensure_online()?;
        Ok(self.employees.read().await.get(&id).cloned())
    }

    async fn insert_employee(&self, mut employee: Employee) -> EngineResult<Employee> {
        self.ensure_online()?;
        let mut guard = self.employees.write().await;
        if guard.values().any(|e| e.username == employee.username) {
            return Err(EngineError::Conflict {
                message: format!("username '{}' is already taken", employee.username),
            });
        }
        employee.id = self.next_id();
        guard.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn list_employees(&self) -> EngineResult<Vec<Employee>> {
        self.ensure_online()?;
        Ok(self.employees.read().await.values().cloned().collect())
    }

    async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> EngineResult<Employee> {
        self.ensure_online()?;
        let mut guard = self.employees.write().await;
        if let Some(username) = &update.username {
            if guard.values().any(|e| e.id != id && &e.username == username) {
                return Err(EngineError::Conflict {
                    message: format!("username '{}' is already taken", username),
                });
            }
        }
        let employee = guard
            .get_mut(&id)
            .ok_or_else(|| EngineError::employee_not_found(id))?;
        update.apply_to(employee);
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: u64) -> EngineResult<Employee> {
        self.ensure_online()?;
        self.employees
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| EngineError::employee_not_found(id))
    }

    async fn deduct_leave_balance(&self, user_id: u64, days: u32) -> EngineResult<u32> {
        self.ensure_online()?;
        let mut guard = self.employees.write().await;
        let employee = guard
            .get_mut(&user_id)
            .ok_or_else(|| EngineError::employee_not_found(user_id))?;
        let previous = employee.leave_balance;
        employee.leave_balance = previous.saturating_sub(days);
        Ok(previous)
    }

    async fn insert_piecework(&self, mut entry: PieceworkEntry) -> EngineResult<PieceworkEntry> {
        self.ensure_online()?;
        let mut guard = self.piecework.write().await;
        let key = entry.key();
        if guard.contains_key(&key) {
            return Err(EngineError::Conflict {
                message: format!(
                    "user {} already submitted {} surveys for {}",
                    entry.user_id, entry.category, entry.date
                ),
            });
        }
        entry.id = self.next_id();
        guard.insert(key, entry.clone());
        Ok(entry)
    }

    async fn list_piecework_by_user_and_month(
        &self,
        user_id: u64,
        month: Month,
    ) -> EngineResult<Vec<PieceworkEntry>> {
        self.ensure_online()?;
        Ok(self
            .piecework
            .read()
            .await
            .values()
            .filter(|e| e.user_id == user_id && month.contains(e.date))
            .cloned()
            .collect())
    }

    async fn list_piecework_by_month(&self, month: Month) -> EngineResult<Vec<PieceworkEntry>> {
        self.ensure_online()?;
        Ok(self
            .piecework
            .read()
            .await
            .values()
            .filter(|e| month.contains(e.date))
            .cloned()
            .collect())
    }

    async fn list_piecework_by_user(&self, user_id: u64) -> EngineResult<Vec<PieceworkEntry>> {
        self.ensure_online()?;
        Ok(self
            .piecework
            .read()
            .await
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_piecework_by_date(&self, date: NaiveDate) -> EngineResult<Vec<PieceworkEntry>> {
        self.ensure_online()?;
        Ok(self
            .piecework
            .read()
            .await
            .values()
            .filter(|e| e.date == date)
            .cloned()
            .collect())
    }

    async fn upsert_rejection(
        &self,
        adjustment: RejectionAdjustment,
    ) -> EngineResult<RejectionAdjustment> {
        self.ensure_online()?;
        self.rejections
            .write()
            .await
            .insert(adjustment.key(), adjustment.clone());
        Ok(adjustment)
    }

    async fn list_rejections_by_user(
        &self,
        user_id: u64,
    ) -> EngineResult<Vec<RejectionAdjustment>> {
        self.ensure_online()?;
        Ok(self
            .rejections
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_rejections_by_month(
        &self,
        month: Month,
    ) -> EngineResult<Vec<RejectionAdjustment>> {
        self.ensure_online()?;
        Ok(self
            .rejections
            .read()
            .await
            .values()
            .filter(|r| r.month == month)
            .cloned()
            .collect())
    }

    async fn insert_leave_request(&self, mut request: LeaveRequest) -> EngineResult<LeaveRequest> {
        self.ensure_online()?;
        request.id = self.next_id();
        self.leave.write().await.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_leave_request(&self, id: u64) -> EngineResult<Option<LeaveRequest>> {
        self.ensure_online()?;
        Ok(self.leave.read().await.get(&id).cloned())
    }

    async fn commit_leave_decision(&self, request: LeaveRequest) -> EngineResult<LeaveRequest> {
        self.ensure_online()?;
        let mut guard = self.leave.write().await;
        let stored = guard.get(&request.id).ok_or_else(|| EngineError::NotFound {
            entity: "leave request",
            id: request.id.to_string(),
        })?;
        if stored.status != LeaveStatus::Pending {
            return Err(EngineError::LeaveAlreadyDecided {
                id: request.id,
                status: stored.status,
            });
        }
        guard.insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_approved_leave_by_user(&self, user_id: u64) -> EngineResult<Vec<LeaveRequest>> {
        self.ensure_online()?;
        Ok(self
            .leave
            .read()
            .await
            .values()
            .filter(|l| l.user_id == user_id && l.is_approved())
            .cloned()
            .collect())
    }

    async fn list_leave_by_user(&self, user_id: u64) -> EngineResult<Vec<LeaveRequest>> {
        self.ensure_online()?;
        Ok(self
            .leave
            .read()
            .await
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_pending_leave(&self) -> EngineResult<Vec<LeaveRequest>> {
        self.ensure_online()?;
        Ok(self
            .leave
            .read()
            .await
            .values()
            .filter(|l| l.status == LeaveStatus::Pending)
            .cloned()
            .collect())
    }

    async fn upsert_salary_record(&self, record: SalaryRecord) -> EngineResult<SalaryRecord> {
        self.ensure_online()?;
        self.salaries
            .write()
            .await
            .insert((record.user_id, record.month), record.clone());
        Ok(record)
    }

    async fn find_salary_record(
        &self,
        user_id: u64,
        month: Month,
    ) -> EngineResult<Option<SalaryRecord>> {
        self.ensure_online()?;
        Ok(self.salaries.read().await.get(&(user_id, month)).cloned())
    }

    async fn list_salary_records_by_month(&self, month: Month) -> EngineResult<Vec<SalaryRecord>> {
        self.ensure_online()?;
        Ok(self
            .salaries
            .read()
            .await
            .values()
            .filter(|s| s.month == month)
            .cloned()
            .collect())
    }

    async fn find_attendance(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> EngineResult<Option<Attendance>> {
        self.ensure_online()?;
        Ok(self.attendance.read().await.get(&(user_id, date)).cloned())
    }

    async fn insert_attendance(&self, mut attendance: Attendance) -> EngineResult<Attendance> {
        self.ensure_online()?;
        let mut guard = self.attendance.write().await;
        let key = (attendance.user_id, attendance.date);
        if guard.contains_key(&key) {
            return Err(EngineError::Conflict {
                message: format!(
                    "user {} already has attendance for {}",
                    attendance.user_id, attendance.date
                ),
            });
        }
        attendance.id = self.next_id();
        guard.insert(key, attendance.clone());
        Ok(attendance)
    }

    async fn update_attendance(&self, attendance: Attendance) -> EngineResult<Attendance> {
        self.ensure_online()?;
        let mut guard = self.attendance.write().await;
        let stored = guard
            .get_mut(&(attendance.user_id, attendance.date))
            .ok_or_else(|| EngineError::NotFound {
                entity: "attendance",
                id: format!("{}/{}", attendance.user_id, attendance.date),
            })?;
        *stored = attendance.clone();
        Ok(attendance)
    }

    async fn list_attendance_by_user(&self, user_id: u64) -> EngineResult<Vec<Attendance>> {
        self.ensure_online()?;
        Ok(self
            .attendance
            .read()
            .await
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_attendance_by_date(&self, date: NaiveDate) -> EngineResult<Vec<Attendance>> {
        self.ensure_online()?;
        Ok(self
            .attendance
            .read()
            .await
            .values()
            .filter(|a| a.date == date)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeaveKind, Role};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(username: &str) -> Employee {
        Employee {
            id: 0,
            username: username.to_string(),
            full_name: "Test User".to_string(),
            email: format!("{}@example.com", username),
            role: Role::Employee,
            department: None,
            is_active: true,
            leave_balance: 12,
        }
    }

    fn entry(user_id: u64, day: NaiveDate, category: SurveyCategory, units: u32) -> PieceworkEntry {
        PieceworkEntry {
            id: 0,
            user_id,
            date: day,
            category,
            units_completed: units,
        }
    }

    fn pending_leave(user_id: u64) -> LeaveRequest {
        LeaveRequest {
            id: 0,
            user_id,
            leave_kind: LeaveKind::Medical,
            start_date: date(2024, 1, 10),
            end_date: date(2024, 1, 11),
            reason: "flu".to_string(),
            status: LeaveStatus::Pending,
            decided_by: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_employee_assigns_ids_and_rejects_duplicate_username() {
        let store = InMemoryStore::new();
        let first = store.insert_employee(employee("alice")).await.unwrap();
        let second = store.insert_employee(employee("bob")).await.unwrap();
        assert_ne!(first.id, second.id);

        let duplicate = store.insert_employee(employee("alice")).await;
        assert!(matches!(duplicate, Err(EngineError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_piecework_is_conflict() {
        let store = InMemoryStore::new();
        store
            .insert_piecework(entry(1, date(2024, 1, 5), SurveyCategory::Ssi, 4))
            .await
            .unwrap();

        let duplicate = store
            .insert_piecework(entry(1, date(2024, 1, 5), SurveyCategory::Ssi, 9))
            .await;
        assert!(matches!(duplicate, Err(EngineError::Conflict { .. })));

        // Same day, other category is fine.
        store
            .insert_piecework(entry(1, date(2024, 1, 5), SurveyCategory::Dynata, 2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_piecework_listed_by_month() {
        let store = InMemoryStore::new();
        store
            .insert_piecework(entry(1, date(2024, 1, 31), SurveyCategory::Yours, 1))
            .await
            .unwrap();
        store
            .insert_piecework(entry(1, date(2024, 2, 1), SurveyCategory::Yours, 1))
            .await
            .unwrap();
        store
            .insert_piecework(entry(2, date(2024, 1, 15), SurveyCategory::Yours, 1))
            .await
            .unwrap();

        let january: Month = "2024-01".parse().unwrap();
        assert_eq!(store.list_piecework_by_user_and_month(1, january).await.unwrap().len(), 1);
        assert_eq!(store.list_piecework_by_month(january).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejection_upsert_overwrites() {
        let store = InMemoryStore::new();
        let month: Month = "2024-01".parse().unwrap();
        let mut adjustment = RejectionAdjustment {
            user_id: 1,
            month,
            category: SurveyCategory::Yours,
            units_rejected: 3,
            recorded_by: 9,
        };
        store.upsert_rejection(adjustment.clone()).await.unwrap();
        adjustment.units_rejected = 5;
        store.upsert_rejection(adjustment).await.unwrap();

        let stored = store.list_rejections_by_user(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].units_rejected, 5);
    }

    #[tokio::test]
    async fn test_commit_leave_decision_only_once() {
        let store = InMemoryStore::new();
        let request = store.insert_leave_request(pending_leave(1)).await.unwrap();

        let mut approved = request.clone();
        approved.status = LeaveStatus::Approved;
        approved.decided_by = Some(9);
        store.commit_leave_decision(approved.clone()).await.unwrap();

        let mut rejected = request;
        rejected.status = LeaveStatus::Rejected;
        match store.commit_leave_decision(rejected).await {
            Err(EngineError::LeaveAlreadyDecided { status, .. }) => {
                assert_eq!(status, LeaveStatus::Approved)
            }
            other => panic!("Expected LeaveAlreadyDecided, got {:?}", other),
        }

        assert_eq!(store.list_approved_leave_by_user(1).await.unwrap(), vec![approved]);
        assert!(store.list_pending_leave().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deduct_leave_balance_floors_and_reports_previous() {
        let store = InMemoryStore::new();
        let stored = store.insert_employee(employee("alice")).await.unwrap();

        assert_eq!(store.deduct_leave_balance(stored.id, 5).await.unwrap(), 12);
        assert_eq!(store.deduct_leave_balance(stored.id, 10).await.unwrap(), 7);
        let after = store.find_employee(stored.id).await.unwrap().unwrap();
        assert_eq!(after.leave_balance, 0);

        let unknown = store.deduct_leave_balance(42, 3).await;
        assert!(matches!(unknown, Err(EngineError::NotFound { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deductions_are_not_lost() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let mut stored = employee("alice");
        stored.leave_balance = 100;
        let id = store.insert_employee(stored).await.unwrap().id;

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.deduct_leave_balance(id, 3).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let after = store.find_employee(id).await.unwrap().unwrap();
        assert_eq!(after.leave_balance, 40);
    }

    #[tokio::test]
    async fn test_update_employee_applies_changes_and_guards_username() {
        let store = InMemoryStore::new();
        let alice = store.insert_employee(employee("alice")).await.unwrap();
        store.insert_employee(employee("bob")).await.unwrap();

        let updated = store
            .update_employee(
                alice.id,
                EmployeeUpdate {
                    department: Some("Field".to_string()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.department.as_deref(), Some("Field"));
        assert!(!updated.is_active);
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.leave_balance, 12);

        let taken = store
            .update_employee(
                alice.id,
                EmployeeUpdate {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(taken, Err(EngineError::Conflict { .. })));

        // Keeping one's own username is not a conflict.
        store
            .update_employee(
                alice.id,
                EmployeeUpdate {
                    username: Some("alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_employee() {
        let store = InMemoryStore::new();
        let alice = store.insert_employee(employee("alice")).await.unwrap();

        assert_eq!(store.delete_employee(alice.id).await.unwrap(), alice);
        assert!(store.find_employee(alice.id).await.unwrap().is_none());
        assert!(store.list_employees().await.unwrap().is_empty());
        assert!(matches!(
            store.delete_employee(alice.id).await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_piecework_and_attendance_listed_by_user_and_date() {
        let store = InMemoryStore::new();
        store
            .insert_piecework(entry(1, date(2024, 1, 5), SurveyCategory::Ssi, 4))
            .await
            .unwrap();
        store
            .insert_piecework(entry(1, date(2024, 1, 6), SurveyCategory::Ssi, 2))
            .await
            .unwrap();
        store
            .insert_piecework(entry(2, date(2024, 1, 5), SurveyCategory::Yours, 3))
            .await
            .unwrap();

        let mine = store.list_piecework_by_user(1).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].date < mine[1].date);
        assert_eq!(store.list_piecework_by_date(date(2024, 1, 5)).await.unwrap().len(), 2);

        for (user_id, day) in [(1, date(2024, 1, 5)), (1, date(2024, 1, 6)), (2, date(2024, 1, 5))] {
            store
                .insert_attendance(Attendance {
                    id: 0,
                    user_id,
                    date: day,
                    check_in: Utc::now(),
                    check_out: None,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.list_attendance_by_user(1).await.unwrap().len(), 2);
        assert_eq!(store.list_attendance_by_date(date(2024, 1, 5)).await.unwrap().len(), 2);
        assert!(store.list_attendance_by_date(date(2024, 1, 7)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_returns_storage_error() {
        let store = InMemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.find_employee(1).await,
            Err(EngineError::Storage { .. })
        ));

        store.set_offline(false);
        assert!(store.find_employee(1).await.unwrap().is_none());
    }
}
