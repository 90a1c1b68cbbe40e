use tracing::info;

use hrm_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    AccountStore, DepartmentRepository, EmployeeDirectory, EmployeeStore, RoleAssignment,
    TransactionScope, UnitOfWork,
};
use crate::domain::types::{
    Account, AccountFields, AccountPatch, EmployeeChanges, EmployeeFields, EmployeeRecord,
    EmployeeView, NewAccount,
};
use crate::error::{FieldErrors, PeopleServiceError};
use crate::usecase::credential::{generate_password, hash_password};

// ── CreateEmployee ───────────────────────────────────────────────────────────

/// Which account a new employee belongs to.
#[derive(Debug, Clone)]
pub enum AccountRef {
    /// An account that must already exist.
    Existing(i64),
    /// Reuse the account registered under `email`, or provision one.
    Provision(AccountFields),
}

#[derive(Debug, Clone)]
pub struct CreateEmployeeInput {
    pub account: AccountRef,
    pub employee: EmployeeFields,
}

/// Resolves (or provisions) the account behind a new employee and links it,
/// reviving the account's soft-deleted employee row when there is one.
pub struct CreateEmployeeUseCase<A, E, D, T>
where
    A: AccountStore,
    E: EmployeeStore,
    D: DepartmentRepository,
    T: TransactionScope,
{
    pub accounts: A,
    pub employees: E,
    pub departments: D,
    pub scope: T,
}

impl<A, E, D, T> CreateEmployeeUseCase<A, E, D, T>
where
    A: AccountStore,
    E: EmployeeStore,
    D: DepartmentRepository,
    T: TransactionScope,
{
    pub async fn execute(
        &self,
        input: CreateEmployeeInput,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        self.check_references(&input).await?;

        let tx = self.scope.begin().await?;
        let account = resolve_account(&tx, input.account).await?;

        let record = match EmployeeStore::find_by_account_id(&tx, account.id, true).await? {
            Some(existing) if existing.is_active() => {
                return Err(PeopleServiceError::ActiveEmployeeExists {
                    account_id: account.id,
                });
            }
            Some(trashed) => {
                tx.restore(trashed.id).await?;
                let revived =
                    EmployeeStore::update(&tx, trashed.id, EmployeeChanges::from(input.employee))
                        .await?;
                info!(
                    employee_id = revived.id,
                    account_id = account.id,
                    "employee revived"
                );
                revived
            }
            None => {
                let created = EmployeeStore::create(&tx, account.id, input.employee).await?;
                info!(
                    employee_id = created.id,
                    account_id = account.id,
                    "employee created"
                );
                created
            }
        };

        tx.commit().await?;
        Ok(record)
    }

    /// Reference checks that need the store, reported before any write.
    async fn check_references(&self, input: &CreateEmployeeInput) -> Result<(), PeopleServiceError> {
        let mut errors = FieldErrors::new();
        match &input.account {
            AccountRef::Existing(account_id) => {
                if self.accounts.find_by_id(*account_id).await?.is_none() {
                    errors.add("user_id", "does not exist");
                } else if self
                    .employees
                    .find_by_account_id(*account_id, false)
                    .await?
                    .is_some()
                {
                    errors.add("user_id", "has already been taken");
                }
            }
            AccountRef::Provision(fields) => {
                if let Some(account) = self.accounts.find_by_email(&fields.email).await? {
                    if self
                        .employees
                        .find_by_account_id(account.id, false)
                        .await?
                        .is_some()
                    {
                        errors.add("email", "already associated with an active employee");
                    }
                }
            }
        }
        if !self.departments.exists(input.employee.department_id).await? {
            errors.add("department_id", "does not exist");
        }
        errors.into_result()
    }
}

async fn resolve_account<Tx>(tx: &Tx, account: AccountRef) -> Result<Account, PeopleServiceError>
where
    Tx: AccountStore + RoleAssignment,
{
    let fields = match account {
        AccountRef::Existing(account_id) => {
            return match AccountStore::find_by_id(tx, account_id).await? {
                Some(account) => Ok(account),
                None => {
                    let mut errors = FieldErrors::new();
                    errors.add("user_id", "does not exist");
                    Err(PeopleServiceError::Validation(errors))
                }
            };
        }
        AccountRef::Provision(fields) => fields,
    };

    if let Some(existing) = AccountStore::find_by_email(tx, &fields.email).await? {
        return Ok(existing);
    }

    let password = fields.password.unwrap_or_else(generate_password);
    let account = AccountStore::create(
        tx,
        NewAccount {
            name: fields.name,
            email: fields.email,
            password_hash: hash_password(&password)?,
        },
    )
    .await?;
    tx.assign_default_role(account.id).await?;
    info!(account_id = account.id, "account provisioned");
    Ok(account)
}

// ── UpdateEmployee ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct UpdateEmployeeInput {
    pub account: AccountPatch,
    pub employee: EmployeeChanges,
}

/// Applies account-level changes to the linked account, then employee-level
/// changes to the record, in one transaction.
pub struct UpdateEmployeeUseCase<A, E, D, T>
where
    A: AccountStore,
    E: EmployeeStore,
    D: DepartmentRepository,
    T: TransactionScope,
{
    pub accounts: A,
    pub employees: E,
    pub departments: D,
    pub scope: T,
}

impl<A, E, D, T> UpdateEmployeeUseCase<A, E, D, T>
where
    A: AccountStore,
    E: EmployeeStore,
    D: DepartmentRepository,
    T: TransactionScope,
{
    pub async fn execute(
        &self,
        id: i64,
        input: UpdateEmployeeInput,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        let current = self
            .employees
            .find_by_id(id)
            .await?
            .ok_or(PeopleServiceError::EmployeeNotFound)?;

        let mut errors = FieldErrors::new();
        if let Some(department_id) = input.employee.department_id {
            if !self.departments.exists(department_id).await? {
                errors.add("department_id", "does not exist");
            }
        }
        if let Some(email) = &input.account.email {
            if let Some(other) = self.accounts.find_by_email(email).await? {
                if other.id != current.account_id {
                    errors.add("email", "has already been taken");
                }
            }
        }
        errors.into_result()?;

        let tx = self.scope.begin().await?;
        let record = EmployeeStore::find_by_id(&tx, id)
            .await?
            .ok_or(PeopleServiceError::EmployeeNotFound)?;

        if !input.account.is_empty() {
            AccountStore::update(&tx, record.account_id, input.account).await?;
        }
        let record = if input.employee.is_empty() {
            record
        } else {
            EmployeeStore::update(&tx, id, input.employee).await?
        };

        tx.commit().await?;
        info!(employee_id = id, account_id = record.account_id, "employee updated");
        Ok(record)
    }
}

// ── DeleteEmployee ───────────────────────────────────────────────────────────

/// Soft-deletes the record. The linked account is kept so history survives
/// and a rehire can reuse its credentials.
pub struct DeleteEmployeeUseCase<T: TransactionScope> {
    pub scope: T,
}

impl<T: TransactionScope> DeleteEmployeeUseCase<T> {
    pub async fn execute(&self, id: i64) -> Result<(), PeopleServiceError> {
        let tx = self.scope.begin().await?;
        let record = EmployeeStore::find_by_id(&tx, id)
            .await?
            .ok_or(PeopleServiceError::EmployeeNotFound)?;
        tx.soft_delete(record.id).await?;
        tx.commit().await?;
        info!(employee_id = id, account_id = record.account_id, "employee soft-deleted");
        Ok(())
    }
}

// ── GetEmployee / ListEmployees ──────────────────────────────────────────────

pub struct GetEmployeeUseCase<R: EmployeeDirectory> {
    pub repo: R,
}

impl<R: EmployeeDirectory> GetEmployeeUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<EmployeeView, PeopleServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or(PeopleServiceError::EmployeeNotFound)
    }
}

pub struct ListEmployeesUseCase<R: EmployeeDirectory> {
    pub repo: R,
}

impl<R: EmployeeDirectory> ListEmployeesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<EmployeeView>, PeopleServiceError> {
        self.repo.list(page.clamped()).await
    }
}
