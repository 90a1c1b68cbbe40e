#![allow(async_fn_in_trait)]

use chrono::NaiveDate;

use hrm_domain::pagination::{Page, PageRequest};
use hrm_domain::role::RoleName;

use crate::domain::types::{
    Account, AccountPatch, Attendance, AttendancePatch, DashboardCounts, Department,
    DepartmentHeadcount, DepartmentPatch, DepartmentView, EmployeeChanges, EmployeeFields,
    EmployeeRecord, EmployeeView, Leave, LeavePatch, NewAccount, NewAttendance, NewDepartment,
    NewLeave, RecentAttendance, RecentLeave,
};
use crate::error::PeopleServiceError;

// ── Write side of the employee flow ──────────────────────────────────────────

/// Login accounts.
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, PeopleServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, PeopleServiceError>;
    async fn create(&self, account: NewAccount) -> Result<Account, PeopleServiceError>;
    /// Apply `patch` and return the fresh row. Fails with `AccountNotFound`.
    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account, PeopleServiceError>;
}

/// Role grants attached to accounts.
pub trait RoleAssignment: Send + Sync {
    /// Grant [`RoleName::DEFAULT`].
    async fn assign_default_role(&self, account_id: i64) -> Result<(), PeopleServiceError>;
    /// Grant `role`. Granting a role the account already holds is a no-op.
    async fn assign_role(&self, account_id: i64, role: RoleName) -> Result<(), PeopleServiceError>;
    async fn roles_of(&self, account_id: i64) -> Result<Vec<RoleName>, PeopleServiceError>;
}

/// Employee records. Every lookup except
/// `find_by_account_id(_, true)` ignores soft-deleted rows.
pub trait EmployeeStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeRecord>, PeopleServiceError>;
    async fn find_by_account_id(
        &self,
        account_id: i64,
        include_deleted: bool,
    ) -> Result<Option<EmployeeRecord>, PeopleServiceError>;
    async fn create(
        &self,
        account_id: i64,
        fields: EmployeeFields,
    ) -> Result<EmployeeRecord, PeopleServiceError>;
    /// Apply `changes` and return the fresh row. Fails with `EmployeeNotFound`.
    async fn update(
        &self,
        id: i64,
        changes: EmployeeChanges,
    ) -> Result<EmployeeRecord, PeopleServiceError>;
    async fn soft_delete(&self, id: i64) -> Result<(), PeopleServiceError>;
    /// Clear the deletion marker of a soft-deleted row.
    async fn restore(&self, id: i64) -> Result<(), PeopleServiceError>;
}

/// An open transaction. Dropping it without [`UnitOfWork::commit`] rolls back.
pub trait UnitOfWork: Sized + Send {
    async fn commit(self) -> Result<(), PeopleServiceError>;
}

/// Opens transactions whose stores see each other's uncommitted writes.
pub trait TransactionScope: Send + Sync {
    type Tx: AccountStore + EmployeeStore + RoleAssignment + UnitOfWork;

    async fn begin(&self) -> Result<Self::Tx, PeopleServiceError>;
}

// ── Read side ────────────────────────────────────────────────────────────────

/// Employees with their account and department, for responses.
pub trait EmployeeDirectory: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<EmployeeView>, PeopleServiceError>;
    async fn get(&self, id: i64) -> Result<Option<EmployeeView>, PeopleServiceError>;
}

pub trait DepartmentRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<DepartmentView>, PeopleServiceError>;
    async fn get(&self, id: i64) -> Result<Option<DepartmentView>, PeopleServiceError>;
    async fn exists(&self, id: i64) -> Result<bool, PeopleServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, PeopleServiceError>;
    async fn create(&self, department: NewDepartment) -> Result<Department, PeopleServiceError>;
    async fn update(
        &self,
        id: i64,
        patch: DepartmentPatch,
    ) -> Result<Department, PeopleServiceError>;
    /// Number of employee rows, soft-deleted included, still pointing at `id`.
    async fn count_employee_rows(&self, id: i64) -> Result<u64, PeopleServiceError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, PeopleServiceError>;
}

pub trait AttendanceRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<Attendance>, PeopleServiceError>;
    async fn get(&self, id: i64) -> Result<Option<Attendance>, PeopleServiceError>;
    async fn create(&self, attendance: NewAttendance) -> Result<Attendance, PeopleServiceError>;
    async fn update(
        &self,
        id: i64,
        patch: AttendancePatch,
    ) -> Result<Attendance, PeopleServiceError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, PeopleServiceError>;
}

pub trait LeaveRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<Leave>, PeopleServiceError>;
    async fn get(&self, id: i64) -> Result<Option<Leave>, PeopleServiceError>;
    async fn create(&self, leave: NewLeave) -> Result<Leave, PeopleServiceError>;
    async fn update(&self, id: i64, patch: LeavePatch) -> Result<Leave, PeopleServiceError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, PeopleServiceError>;
}

/// Aggregates behind `GET /api/dashboard/stats`.
pub trait DashboardQueryPort: Send + Sync {
    async fn counts(&self, today: NaiveDate) -> Result<DashboardCounts, PeopleServiceError>;
    /// Most recently updated attendance rows, newest first.
    async fn recent_attendances(
        &self,
        limit: u64,
    ) -> Result<Vec<RecentAttendance>, PeopleServiceError>;
    /// Most recently created leave requests, newest first.
    async fn recent_leaves(&self, limit: u64) -> Result<Vec<RecentLeave>, PeopleServiceError>;
    async fn department_headcounts(&self)
    -> Result<Vec<DepartmentHeadcount>, PeopleServiceError>;
}
