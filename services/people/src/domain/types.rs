use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use hrm_domain::attendance::AttendanceStatus;
use hrm_domain::employee::EmployeeStatus;
use hrm_domain::leave::{LeaveStatus, LeaveType};

// ── Accounts ─────────────────────────────────────────────────────────────────

/// Login identity. Never deleted by the employee flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Row to insert when provisioning an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Identity fields used to find or provision the account behind a new employee.
#[derive(Debug, Clone)]
pub struct AccountFields {
    pub name: String,
    pub email: String,
    /// Plain-text password; a random one is generated when absent.
    pub password: Option<String>,
}

/// Account-level part of an employee update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Account fields embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

// ── Employees ────────────────────────────────────────────────────────────────

/// Optional contact details of an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

/// Employee-level fields supplied when an employee is created or revived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFields {
    pub department_id: i64,
    pub position: String,
    pub salary: Decimal,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub contact: ContactFields,
}

/// Partial employee update. For the nullable contact fields the outer `Option`
/// means "leave as is" and `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeChanges {
    pub department_id: Option<i64>,
    pub position: Option<String>,
    pub salary: Option<Decimal>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub postal_code: Option<Option<String>>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Revival overwrites every required field; contact fields only when supplied.
impl From<EmployeeFields> for EmployeeChanges {
    fn from(fields: EmployeeFields) -> Self {
        let ContactFields {
            phone,
            address,
            city,
            country,
            postal_code,
        } = fields.contact;
        Self {
            department_id: Some(fields.department_id),
            position: Some(fields.position),
            salary: Some(fields.salary),
            hire_date: Some(fields.hire_date),
            status: Some(fields.status),
            phone: phone.map(Some),
            address: address.map(Some),
            city: city.map(Some),
            country: country.map(Some),
            postal_code: postal_code.map(Some),
        }
    }
}

/// HR profile attached to exactly one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub id: i64,
    pub account_id: i64,
    pub department_id: i64,
    pub position: String,
    pub salary: Decimal,
    pub hire_date: NaiveDate,
    pub contact: ContactFields,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EmployeeRecord {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Employee with its account and department loaded.
#[derive(Debug, Clone)]
pub struct EmployeeView {
    pub record: EmployeeRecord,
    pub account: AccountSummary,
    pub department: Option<DepartmentSummary>,
}

// ── Departments ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Department with its manager and active headcount.
#[derive(Debug, Clone)]
pub struct DepartmentView {
    pub department: Department,
    pub manager: Option<AccountSummary>,
    pub employees_count: u64,
}

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub manager_id: Option<Option<i64>>,
}

// ── Attendance ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendancePatch {
    pub check_in: Option<Option<DateTime<Utc>>>,
    pub check_out: Option<Option<DateTime<Utc>>>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<Option<String>>,
}

// ── Leave requests ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leave {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub approved_by: Option<i64>,
    pub approval_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub employee_id: i64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub approved_by: Option<i64>,
    pub approval_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct LeavePatch {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub status: Option<LeaveStatus>,
    pub approved_by: Option<Option<i64>>,
    pub approval_date: Option<Option<NaiveDate>>,
}

// ── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub total_employees: u64,
    pub active_employees: u64,
    pub today_attendance: u64,
    pub pending_leaves: u64,
}

/// Attendance row as shown in the activity feed. `employee_name` is `None`
/// when the employee or its account is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentAttendance {
    pub id: i64,
    pub employee_name: Option<String>,
    pub checked_out: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentLeave {
    pub id: i64,
    pub employee_name: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentHeadcount {
    pub name: String,
    pub count: u64,
}
