//! Employee model and related types.
//!
//! This module defines the Employee struct and Role enum for the people
//! whose piecework, leave and salary the engine tracks.

use serde::{Deserialize, Serialize};

/// The role of a user in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular employee submitting piecework and leave requests.
    #[default]
    Employee,
    /// An administrator recording rejections, deciding leave and running payroll.
    Admin,
}

/// Represents a user of the payroll system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier, assigned by the store.
    pub id: u64,
    /// Unique login name.
    pub username: String,
    /// The employee's full name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Whether the user is an employee or an admin.
    #[serde(default)]
    pub role: Role,
    /// Optional department.
    #[serde(default)]
    pub department: Option<String>,
    /// Whether the account is active.
    pub is_active: bool,
    /// Remaining leave days.
    pub leave_balance: u32,
}

impl Employee {
    /// Returns true if the user is an admin.
    ///
    /// # Examples
    ///
    /// ```
    /// use survey_payroll::models::{Employee, Role};
    ///
    /// let admin = Employee {
    ///     id: 1,
    ///     username: "admin".to_string(),
    ///     full_name: "Site Admin".to_string(),
    ///     email: "admin@example.com".to_string(),
    ///     role: Role::Admin,
    ///     department: None,
    ///     is_active: true,
    ///     leave_balance: 12,
    /// };
    /// assert!(admin.is_admin());
    /// ```
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A partial change to an [`Employee`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeUpdate {
    /// New login name.
    pub username: Option<String>,
    /// New full name.
    pub full_name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New department.
    pub department: Option<String>,
    /// Activate or deactivate the account.
    pub is_active: Option<bool>,
    /// Overwrite the remaining leave days.
    pub leave_balance: Option<u32>,
}

impl EmployeeUpdate {
    /// Returns true if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every present field into `employee`.
    pub fn apply_to(self, employee: &mut Employee) {
        if let Some(username) = self.username {
            employee.username = username;
        }
        if let Some(full_name) = self.full_name {
            employee.full_name = full_name;
        }
        if let Some(email) = self.email {
            employee.email = email;
        }
        if let Some(role) = self.role {
            employee.role = role;
        }
        if let Some(department) = self.department {
            employee.department = Some(department);
        }
        if let Some(is_active) = self.is_active {
            employee.is_active = is_active;
        }
        if let Some(leave_balance) = self.leave_balance {
            employee.leave_balance = leave_balance;
        }
    }
}

/// The identifying fields of an employee attached to admin listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    /// The employee's id.
    pub id: u64,
    /// Login name.
    pub username: String,
    /// Full name.
    pub full_name: String,
    /// Department, if any.
    pub department: Option<String>,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            username: employee.username.clone(),
            full_name: employee.full_name.clone(),
            department: employee.department.clone(),
        }
    }
}

/// A record together with the employee it belongs to.
///
/// The record's own fields are flattened into the JSON object. `employee` is
/// `None` when the user has since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithEmployee<T> {
    /// The record.
    #[serde(flatten)]
    pub record: T,
    /// The employee the record belongs to.
    pub employee: Option<EmployeeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee_defaults_role() {
        let json = r#"{
            "id": 4,
            "username": "jdoe",
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "is_active": true,
            "leave_balance": 12
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.role, Role::Employee);
        assert_eq!(employee.department, None);
        assert!(!employee.is_admin());
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let mut employee: Employee = serde_json::from_str(
            r#"{"id": 4, "username": "jdoe", "full_name": "Jane Doe",
                "email": "jane@example.com", "is_active": true, "leave_balance": 12}"#,
        )
        .unwrap();
        let update: EmployeeUpdate =
            serde_json::from_str(r#"{"email": "jd@example.com", "leave_balance": 5}"#).unwrap();
        assert!(!update.is_empty());

        update.apply_to(&mut employee);
        assert_eq!(employee.email, "jd@example.com");
        assert_eq!(employee.leave_balance, 5);
        assert_eq!(employee.full_name, "Jane Doe");
        assert!(employee.is_active);
        assert!(EmployeeUpdate::default().is_empty());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"employee\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
