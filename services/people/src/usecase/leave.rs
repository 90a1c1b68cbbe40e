use chrono::NaiveDate;
use tracing::info;

use hrm_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AccountStore, EmployeeStore, LeaveRepository};
use crate::domain::types::{Leave, LeavePatch, NewLeave};
use crate::error::{FieldErrors, PeopleServiceError};

fn check_period(errors: &mut FieldErrors, start_date: NaiveDate, end_date: NaiveDate) {
    if end_date < start_date {
        errors.add("end_date", "must be a date after or equal to start_date");
    }
}

// ── ListLeaves / GetLeave ────────────────────────────────────────────────────

pub struct ListLeavesUseCase<R: LeaveRepository> {
    pub repo: R,
}

impl<R: LeaveRepository> ListLeavesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<Leave>, PeopleServiceError> {
        self.repo.list(page.clamped()).await
    }
}

pub struct GetLeaveUseCase<R: LeaveRepository> {
    pub repo: R,
}

impl<R: LeaveRepository> GetLeaveUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<Leave, PeopleServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or(PeopleServiceError::LeaveNotFound)
    }
}

// ── CreateLeave ──────────────────────────────────────────────────────────────

pub struct CreateLeaveUseCase<R, E, A>
where
    R: LeaveRepository,
    E: EmployeeStore,
    A: AccountStore,
{
    pub repo: R,
    pub employees: E,
    pub accounts: A,
}

impl<R, E, A> CreateLeaveUseCase<R, E, A>
where
    R: LeaveRepository,
    E: EmployeeStore,
    A: AccountStore,
{
    pub async fn execute(&self, input: NewLeave) -> Result<Leave, PeopleServiceError> {
        let mut errors = FieldErrors::new();
        if self.employees.find_by_id(input.employee_id).await?.is_none() {
            errors.add("employee_id", "does not exist");
        }
        if let Some(approver) = input.approved_by {
            if self.accounts.find_by_id(approver).await?.is_none() {
                errors.add("approved_by", "does not exist");
            }
        }
        check_period(&mut errors, input.start_date, input.end_date);
        errors.into_result()?;

        let leave = self.repo.create(input).await?;
        info!(
            leave_id = leave.id,
            employee_id = leave.employee_id,
            "leave requested"
        );
        Ok(leave)
    }
}

// ── UpdateLeave ──────────────────────────────────────────────────────────────

pub struct UpdateLeaveUseCase<R: LeaveRepository, A: AccountStore> {
    pub repo: R,
    pub accounts: A,
}

impl<R: LeaveRepository, A: AccountStore> UpdateLeaveUseCase<R, A> {
    /// The date order is checked on the stored values merged with the patch.
    pub async fn execute(&self, id: i64, patch: LeavePatch) -> Result<Leave, PeopleServiceError> {
        let current = self
            .repo
            .get(id)
            .await?
            .ok_or(PeopleServiceError::LeaveNotFound)?;

        let mut errors = FieldErrors::new();
        if let Some(Some(approver)) = patch.approved_by {
            if self.accounts.find_by_id(approver).await?.is_none() {
                errors.add("approved_by", "does not exist");
            }
        }
        check_period(
            &mut errors,
            patch.start_date.unwrap_or(current.start_date),
            patch.end_date.unwrap_or(current.end_date),
        );
        errors.into_result()?;

        let leave = self.repo.update(id, patch).await?;
        info!(leave_id = id, status = %leave.status, "leave updated");
        Ok(leave)
    }
}

// ── DeleteLeave ──────────────────────────────────────────────────────────────

pub struct DeleteLeaveUseCase<R: LeaveRepository> {
    pub repo: R,
}

impl<R: LeaveRepository> DeleteLeaveUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), PeopleServiceError> {
        if !self.repo.delete(id).await? {
            return Err(PeopleServiceError::LeaveNotFound);
        }
        info!(leave_id = id, "leave deleted");
        Ok(())
    }
}
