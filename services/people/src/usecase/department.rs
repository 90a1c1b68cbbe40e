use tracing::info;

use hrm_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AccountStore, DepartmentRepository};
use crate::domain::types::{Department, DepartmentPatch, DepartmentView, NewDepartment};
use crate::error::{FieldErrors, PeopleServiceError};

// ── ListDepartments / GetDepartment ──────────────────────────────────────────

pub struct ListDepartmentsUseCase<D: DepartmentRepository> {
    pub repo: D,
}

impl<D: DepartmentRepository> ListDepartmentsUseCase<D> {
    pub async fn execute(
        &self,
        page: PageRequest,
    ) -> Result<Page<DepartmentView>, PeopleServiceError> {
        self.repo.list(page.clamped()).await
    }
}

pub struct GetDepartmentUseCase<D: DepartmentRepository> {
    pub repo: D,
}

impl<D: DepartmentRepository> GetDepartmentUseCase<D> {
    pub async fn execute(&self, id: i64) -> Result<DepartmentView, PeopleServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or(PeopleServiceError::DepartmentNotFound)
    }
}

// ── CreateDepartment ─────────────────────────────────────────────────────────

pub struct CreateDepartmentUseCase<D: DepartmentRepository, A: AccountStore> {
    pub repo: D,
    pub accounts: A,
}

impl<D: DepartmentRepository, A: AccountStore> CreateDepartmentUseCase<D, A> {
    pub async fn execute(&self, input: NewDepartment) -> Result<Department, PeopleServiceError> {
        let mut errors = FieldErrors::new();
        if self.repo.find_by_name(&input.name).await?.is_some() {
            errors.add("name", "has already been taken");
        }
        if let Some(manager_id) = input.manager_id {
            if self.accounts.find_by_id(manager_id).await?.is_none() {
                errors.add("manager_id", "does not exist");
            }
        }
        errors.into_result()?;

        let department = self.repo.create(input).await?;
        info!(department_id = department.id, "department created");
        Ok(department)
    }
}

// ── UpdateDepartment ─────────────────────────────────────────────────────────

pub struct UpdateDepartmentUseCase<D: DepartmentRepository, A: AccountStore> {
    pub repo: D,
    pub accounts: A,
}

impl<D: DepartmentRepository, A: AccountStore> UpdateDepartmentUseCase<D, A> {
    pub async fn execute(
        &self,
        id: i64,
        patch: DepartmentPatch,
    ) -> Result<Department, PeopleServiceError> {
        if !self.repo.exists(id).await? {
            return Err(PeopleServiceError::DepartmentNotFound);
        }

        let mut errors = FieldErrors::new();
        if let Some(name) = &patch.name {
            if let Some(other) = self.repo.find_by_name(name).await? {
                if other.id != id {
                    errors.add("name", "has already been taken");
                }
            }
        }
        if let Some(Some(manager_id)) = patch.manager_id {
            if self.accounts.find_by_id(manager_id).await?.is_none() {
                errors.add("manager_id", "does not exist");
            }
        }
        errors.into_result()?;

        let department = self.repo.update(id, patch).await?;
        info!(department_id = id, "department updated");
        Ok(department)
    }
}

// ── DeleteDepartment ─────────────────────────────────────────────────────────

/// Refuses while any employee row, soft-deleted included, references the department.
pub struct DeleteDepartmentUseCase<D: DepartmentRepository> {
    pub repo: D,
}

impl<D: DepartmentRepository> DeleteDepartmentUseCase<D> {
    pub async fn execute(&self, id: i64) -> Result<(), PeopleServiceError> {
        if !self.repo.exists(id).await? {
            return Err(PeopleServiceError::DepartmentNotFound);
        }
        if self.repo.count_employee_rows(id).await? > 0 {
            return Err(PeopleServiceError::DepartmentInUse);
        }
        if !self.repo.delete(id).await? {
            return Err(PeopleServiceError::DepartmentNotFound);
        }
        info!(department_id = id, "department deleted");
        Ok(())
    }
}
