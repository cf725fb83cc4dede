//! Payroll operations over a store.
//!
//! [`PayrollService`] is the entry point the HTTP layer calls. It validates
//! caller input, reads what a calculation needs from a [`PayrollStore`], runs
//! the pure functions in [`crate::calculation`], and writes the results back.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    SalaryInputs, apply_leave_balance_deduction, calculate_salary_breakdown,
    count_leave_days_in_month, decide_leave,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Attendance, AuditTrace, CategoryStats, DailySubmissions, DashboardStats, Employee,
    EmployeeSummary, EmployeeUpdate, LeaveDecision, LeaveDecisionOutcome, LeaveKind, LeaveRequest,
    LeaveStatus, Month, PieceworkEntry, RejectionAdjustment, Role, SalaryCalculation, SalaryRecord,
    SurveyCategory, SurveyStats, WithEmployee,
};
use crate::storage::PayrollStore;

/// The fields needed to register an employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    /// Unique login name.
    pub username: String,
    /// Full name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Employee or admin.
    pub role: Role,
    /// Optional department.
    pub department: Option<String>,
    /// Starting leave balance; the configured default when `None`.
    pub leave_balance: Option<u32>,
}

/// The fields of a new leave request.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    /// The employee asking for leave.
    pub user_id: u64,
    /// The kind of leave.
    pub leave_kind: LeaveKind,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Why the leave is needed.
    pub reason: String,
}

/// The attendance record after a check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    /// The record for the day.
    pub attendance: Attendance,
    /// False when the employee had already checked in that day.
    pub created: bool,
}

/// Payroll operations backed by a [`PayrollStore`] and a pay schedule.
///
/// Cloning is cheap; clones share the store and configuration.
#[derive(Clone)]
pub struct PayrollService {
    store: Arc<dyn PayrollStore>,
    config: Arc<ConfigLoader>,
}

impl PayrollService {
    /// Creates a service over `store` using the schedule in `config`.
    pub fn new(store: Arc<dyn PayrollStore>, config: ConfigLoader) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    async fn require_employee(&self, user_id: u64) -> EngineResult<Employee> {
        self.store
            .find_employee(user_id)
            .await?
            .ok_or_else(|| EngineError::employee_not_found(user_id))
    }

    /// Pairs each record with a summary of the employee it belongs to.
    async fn with_employees<T>(
        &self,
        records: Vec<T>,
        user_id: fn(&T) -> u64,
    ) -> EngineResult<Vec<WithEmployee<T>>> {
        let employees: BTreeMap<u64, EmployeeSummary> = self
            .store
            .list_employees()
            .await?
            .iter()
            .map(|e| (e.id, EmployeeSummary::from(e)))
            .collect();
        Ok(records
            .into_iter()
            .map(|record| {
                let employee = employees.get(&user_id(&record)).cloned();
                WithEmployee { record, employee }
            })
            .collect())
    }

    /// Registers an employee.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank username, `Conflict` if the username is taken.
    pub async fn create_employee(&self, new: NewEmployee) -> EngineResult<Employee> {
        let username = new.username.trim().to_string();
        if username.is_empty() {
            return Err(EngineError::invalid_input("username", "must not be empty"));
        }

        let employee = Employee {
            id: 0,
            username,
            full_name: new.full_name,
            email: new.email,
            role: new.role,
            department: new.department,
            is_active: true,
            leave_balance: new
                .leave_balance
                .unwrap_or(self.config.leave_policy().default_balance),
        };

        let stored = self.store.insert_employee(employee).await?;
        info!(user_id = stored.id, username = %stored.username, "Employee created");
        Ok(stored)
    }

    /// Looks up an employee.
    pub async fn get_employee(&self, user_id: u64) -> EngineResult<Employee> {
        self.require_employee(user_id).await
    }

    /// Every user, admins included.
    pub async fn list_employees(&self) -> EngineResult<Vec<Employee>> {
        self.store.list_employees().await
    }

    /// Changes the given fields of an employee.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty update or a blank username, `NotFound` for
    /// an unknown user, `Conflict` if the new username is taken.
    pub async fn update_employee(
        &self,
        user_id: u64,
        mut update: EmployeeUpdate,
    ) -> EngineResult<Employee> {
        if update.is_empty() {
            return Err(EngineError::invalid_input("body", "no fields to update"));
        }
        if let Some(username) = update.username.take() {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(EngineError::invalid_input("username", "must not be empty"));
            }
            update.username = Some(username);
        }

        let employee = self.store.update_employee(user_id, update).await?;
        info!(user_id, username = %employee.username, "Employee updated");
        Ok(employee)
    }

    /// Removes an employee. Admin accounts cannot be removed.
    ///
    /// Piecework, leave and salary records of the employee are kept.
    pub async fn delete_employee(&self, user_id: u64) -> EngineResult<Employee> {
        let employee = self.require_employee(user_id).await?;
        if employee.is_admin() {
            return Err(EngineError::Forbidden {
                message: format!("user {} is an admin and cannot be deleted", user_id),
            });
        }

        let removed = self.store.delete_employee(user_id).await?;
        info!(user_id, username = %removed.username, "Employee deleted");
        Ok(removed)
    }

    /// Calculates and stores the salary of `user_id` for `month`.
    ///
    /// The employee must exist; nothing is read or written otherwise. The
    /// salary record upsert is the only write, so recalculating with unchanged
    /// inputs leaves one record with identical figures.
    pub async fn calculate_salary(
        &self,
        user_id: u64,
        month: Month,
        computed_by: u64,
    ) -> EngineResult<SalaryCalculation> {
        let start_time = Instant::now();
        self.require_employee(user_id).await?;

        let piecework = self
            .store
            .list_piecework_by_user_and_month(user_id, month)
            .await?;
        let rejections = self.store.list_rejections_by_user(user_id).await?;
        let approved_leave = self.store.list_approved_leave_by_user(user_id).await?;
        debug!(
            user_id,
            month = %month,
            piecework = piecework.len(),
            rejections = rejections.len(),
            approved_leave = approved_leave.len(),
            "Fetched salary inputs"
        );

        let inputs = SalaryInputs {
            month,
            piecework: &piecework,
            rejections: &rejections,
            approved_leave: &approved_leave,
        };
        let breakdown = calculate_salary_breakdown(inputs, self.config.config())?;

        let record = breakdown.to_record(user_id, computed_by, Utc::now());
        let salary = self.store.upsert_salary_record(record).await?;

        for warning in &breakdown.warnings {
            warn!(user_id, month = %month, code = %warning.code, "{}", warning.message);
        }
        info!(
            user_id,
            month = %month,
            gross_pay = %salary.gross_pay,
            final_pay = %salary.final_pay,
            leave_days = breakdown.leave_days,
            "Salary calculated"
        );

        Ok(SalaryCalculation {
            calculation_id: Uuid::new_v4(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            leave_days: breakdown.leave_days,
            salary,
            audit_trace: AuditTrace {
                steps: breakdown.audit_steps,
                warnings: breakdown.warnings,
                duration_us: start_time.elapsed().as_micros() as u64,
            },
        })
    }

    /// Counts the approved leave days of `user_id` inside `month`.
    pub async fn count_approved_leave_days(&self, user_id: u64, month: Month) -> EngineResult<u32> {
        self.require_employee(user_id).await?;
        let approved = self.store.list_approved_leave_by_user(user_id).await?;
        Ok(count_leave_days_in_month(&approved, month, 1).leave_days)
    }

    /// Records one day's completed units for a category.
    ///
    /// # Errors
    ///
    /// `InvalidInput` unless `units` is positive, `NotFound` for an unknown
    /// user, `Conflict` if the category was already submitted that day.
    pub async fn submit_piecework(
        &self,
        user_id: u64,
        category: SurveyCategory,
        units: i64,
        date: NaiveDate,
    ) -> EngineResult<PieceworkEntry> {
        if units <= 0 {
            return Err(EngineError::invalid_input(
                "completed",
                format!("must be a positive number of surveys, got {}", units),
            ));
        }
        let units_completed = u32::try_from(units)
            .map_err(|_| EngineError::invalid_input("completed", "too many surveys"))?;
        self.require_employee(user_id).await?;

        let entry = self
            .store
            .insert_piecework(PieceworkEntry {
                id: 0,
                user_id,
                date,
                category,
                units_completed,
            })
            .await?;
        info!(user_id, date = %date, category = %category, units_completed, "Piecework submitted");
        Ok(entry)
    }

    /// Records (or replaces) the rejected units for a category and month.
    pub async fn record_rejection(
        &self,
        user_id: u64,
        month: Month,
        category: SurveyCategory,
        units: i64,
        recorded_by: u64,
    ) -> EngineResult<RejectionAdjustment> {
        let units_rejected = u32::try_from(units).map_err(|_| {
            EngineError::invalid_input(
                "rejected",
                format!("must be a non-negative number of surveys, got {}", units),
            )
        })?;
        self.require_employee(user_id).await?;

        let adjustment = self
            .store
            .upsert_rejection(RejectionAdjustment {
                user_id,
                month,
                category,
                units_rejected,
                recorded_by,
            })
            .await?;
        info!(user_id, month = %month, category = %category, units_rejected, "Rejection recorded");
        Ok(adjustment)
    }

    /// Every piecework entry of one employee, oldest first.
    pub async fn list_piecework_for_user(&self, user_id: u64) -> EngineResult<Vec<PieceworkEntry>> {
        self.require_employee(user_id).await?;
        self.store.list_piecework_by_user(user_id).await
    }

    /// What one employee submitted on `date`, for every category.
    pub async fn piecework_for_day(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> EngineResult<DailySubmissions> {
        self.require_employee(user_id).await?;
        let mut day: DailySubmissions = SurveyCategory::ALL
            .into_iter()
            .map(|category| (category, None))
            .collect();
        for entry in self.store.list_piecework_by_date(date).await? {
            if entry.user_id == user_id {
                day.insert(entry.category, Some(entry));
            }
        }
        Ok(day)
    }

    /// Every submission for `date`, with the submitting employee.
    pub async fn piecework_by_date(
        &self,
        date: NaiveDate,
    ) -> EngineResult<Vec<WithEmployee<PieceworkEntry>>> {
        let entries = self.store.list_piecework_by_date(date).await?;
        self.with_employees(entries, |e| e.user_id).await
    }

    /// Every rejection adjustment recorded for `month`, with the employee.
    pub async fn list_rejections(
        &self,
        month: Month,
    ) -> EngineResult<Vec<WithEmployee<RejectionAdjustment>>> {
        let adjustments = self.store.list_rejections_by_month(month).await?;
        self.with_employees(adjustments, |a| a.user_id).await
    }

    /// Files a pending leave request.
    pub async fn request_leave(
        &self,
        new: NewLeaveRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        if new.start_date > new.end_date {
            return Err(EngineError::invalid_input(
                "end_date",
                format!("{} is before start date {}", new.end_date, new.start_date),
            ));
        }
        let reason = new.reason.trim().to_string();
        if reason.is_empty() {
            return Err(EngineError::invalid_input("reason", "must not be empty"));
        }
        self.require_employee(new.user_id).await?;

        let request = self
            .store
            .insert_leave_request(LeaveRequest {
                id: 0,
                user_id: new.user_id,
                leave_kind: new.leave_kind,
                start_date: new.start_date,
                end_date: new.end_date,
                reason,
                status: LeaveStatus::Pending,
                decided_by: None,
                created_at: now,
            })
            .await?;
        info!(
            leave_request_id = request.id,
            user_id = request.user_id,
            days = request.inclusive_days(),
            "Leave requested"
        );
        Ok(request)
    }

    /// Approves or rejects a pending leave request.
    ///
    /// Approval lowers the employee's leave balance by the request's inclusive
    /// day count, never below zero. The store applies the deduction atomically,
    /// so approvals of different requests for the same employee never lose a
    /// decrement.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown request or employee, `LeaveAlreadyDecided`
    /// once the request has left the pending state.
    pub async fn decide_leave_request(
        &self,
        request_id: u64,
        decision: LeaveDecision,
        admin_id: u64,
    ) -> EngineResult<LeaveDecisionOutcome> {
        let start_time = Instant::now();
        let request = self
            .store
            .find_leave_request(request_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "leave request",
                id: request_id.to_string(),
            })?;
        self.require_employee(request.user_id).await?;

        let outcome = decide_leave(&request, decision, admin_id, 1)?;
        let committed = self.store.commit_leave_decision(outcome.request).await?;
        let mut steps = vec![outcome.audit_step];

        let leave_balance = if committed.is_approved() {
            let previous = self
                .store
                .deduct_leave_balance(committed.user_id, outcome.balance_deduction)
                .await?;
            let balance = apply_leave_balance_deduction(previous, outcome.balance_deduction, 2);
            steps.push(balance.audit_step);
            Some(balance.new_balance)
        } else {
            None
        };

        info!(
            leave_request_id = committed.id,
            user_id = committed.user_id,
            status = %committed.status,
            day_count = outcome.day_count,
            leave_balance = ?leave_balance,
            admin_id,
            "Leave request decided"
        );
        Ok(LeaveDecisionOutcome {
            request: committed,
            leave_balance,
            audit_trace: AuditTrace {
                steps,
                warnings: Vec::new(),
                duration_us: start_time.elapsed().as_micros() as u64,
            },
        })
    }

    /// All leave requests waiting for a decision.
    pub async fn list_pending_leave(&self) -> EngineResult<Vec<LeaveRequest>> {
        self.store.list_pending_leave().await
    }

    /// All leave requests of one employee.
    pub async fn list_leave_for_user(&self, user_id: u64) -> EngineResult<Vec<LeaveRequest>> {
        self.require_employee(user_id).await?;
        self.store.list_leave_by_user(user_id).await
    }

    /// The stored salary of `user_id` for `month`.
    pub async fn get_salary(&self, user_id: u64, month: Month) -> EngineResult<SalaryRecord> {
        self.store
            .find_salary_record(user_id, month)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "salary record",
                id: format!("{}/{}", user_id, month),
            })
    }

    /// Every stored salary for `month`.
    pub async fn list_salaries(&self, month: Month) -> EngineResult<Vec<SalaryRecord>> {
        self.store.list_salary_records_by_month(month).await
    }

    /// Completed and rejected units per category for `month`, across employees.
    pub async fn survey_stats(&self, month: Month) -> EngineResult<SurveyStats> {
        let mut stats: SurveyStats = SurveyCategory::ALL
            .into_iter()
            .map(|category| (category, CategoryStats::default()))
            .collect();

        for entry in self.store.list_piecework_by_month(month).await? {
            stats.entry(entry.category).or_default().completed += u64::from(entry.units_completed);
        }
        for adjustment in self.store.list_rejections_by_month(month).await? {
            stats.entry(adjustment.category).or_default().rejected +=
                u64::from(adjustment.units_rejected);
        }
        Ok(stats)
    }

    /// Headline figures for the admin dashboard: head count, attendance and
    /// submissions on `today`, pending leave, and the survey totals for `month`.
    pub async fn dashboard_stats(
        &self,
        month: Month,
        today: NaiveDate,
    ) -> EngineResult<DashboardStats> {
        let employee_count = self
            .store
            .list_employees()
            .await?
            .iter()
            .filter(|e| e.role == Role::Employee)
            .count() as u64;
        let present_today = self.store.list_attendance_by_date(today).await?.len() as u64;
        let pending_leaves = self.store.list_pending_leave().await?.len() as u64;
        let surveys_today = self
            .store
            .list_piecework_by_date(today)
            .await?
            .iter()
            .map(|e| u64::from(e.units_completed))
            .sum();
        let survey_stats = self.survey_stats(month).await?;

        debug!(month = %month, date = %today, employee_count, present_today, "Dashboard computed");
        Ok(DashboardStats {
            month,
            date: today,
            employee_count,
            present_today,
            pending_leaves,
            surveys_today,
            survey_stats,
        })
    }

    /// Checks `user_id` in for `date`.
    ///
    /// Checking in twice before checking out returns the existing record with
    /// `created` unset. Checking in after checking out is a conflict.
    pub async fn check_in(
        &self,
        user_id: u64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> EngineResult<CheckIn> {
        self.require_employee(user_id).await?;

        if let Some(existing) = self.store.find_attendance(user_id, date).await? {
            if existing.is_complete() {
                return Err(EngineError::Conflict {
                    message: format!("user {} already checked out for {}", user_id, date),
                });
            }
            debug!(user_id, date = %date, "Already checked in");
            return Ok(CheckIn {
                attendance: existing,
                created: false,
            });
        }

        let attendance = self
            .store
            .insert_attendance(Attendance {
                id: 0,
                user_id,
                date,
                check_in: now,
                check_out: None,
            })
            .await?;
        info!(user_id, date = %date, "Checked in");
        Ok(CheckIn {
            attendance,
            created: true,
        })
    }

    /// Checks `user_id` out for `date`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` without a prior check-in, `Conflict` if already checked out.
    pub async fn check_out(
        &self,
        user_id: u64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> EngineResult<Attendance> {
        self.require_employee(user_id).await?;

        let mut attendance = self
            .store
            .find_attendance(user_id, date)
            .await?
            .ok_or_else(|| EngineError::invalid_input("date", format!("check in first for {}", date)))?;
        if attendance.is_complete() {
            return Err(EngineError::Conflict {
                message: format!("user {} already checked out for {}", user_id, date),
            });
        }

        attendance.check_out = Some(now);
        let attendance = self.store.update_attendance(attendance).await?;
        info!(user_id, date = %date, "Checked out");
        Ok(attendance)
    }

    /// Every attendance record of one employee, oldest first.
    pub async fn list_attendance_for_user(&self, user_id: u64) -> EngineResult<Vec<Attendance>> {
        self.require_employee(user_id).await?;
        self.store.list_attendance_by_user(user_id).await
    }

    /// One employee's attendance for `date`, if they checked in.
    pub async fn attendance_for_day(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> EngineResult<Option<Attendance>> {
        self.require_employee(user_id).await?;
        self.store.find_attendance(user_id, date).await
    }

    /// Everyone's attendance for `date`, with the employee.
    pub async fn attendance_by_date(
        &self,
        date: NaiveDate,
    ) -> EngineResult<Vec<WithEmployee<Attendance>>> {
        let records = self.store.list_attendance_by_date(date).await?;
        self.with_employees(records, |a| a.user_id).await
    }
}
