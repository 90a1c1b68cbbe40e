use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use hrm_domain::employee::EmployeeStatus;
use hrm_domain::pagination::{Page, PageRequest};
use hrm_domain::role::RoleName;
use hrm_people::domain::repository::{
    AccountStore, DepartmentRepository, EmployeeDirectory, EmployeeStore, RoleAssignment,
    TransactionScope, UnitOfWork,
};
use hrm_people::domain::types::{
    Account, AccountPatch, AccountSummary, ContactFields, Department, DepartmentPatch,
    DepartmentSummary, DepartmentView, EmployeeChanges, EmployeeFields, EmployeeRecord,
    EmployeeView, NewAccount, NewDepartment,
};
use hrm_people::error::PeopleServiceError;

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// Everything the in-memory stores hold. A transaction works on a clone.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub roles: Vec<(i64, RoleName)>,
    pub employees: Vec<EmployeeRecord>,
    pub departments: Vec<Department>,
    /// Makes the next employee insert or update fail.
    pub fail_employee_writes: bool,
}

impl Snapshot {
    fn next_id<T>(rows: &[T], id: impl Fn(&T) -> i64) -> i64 {
        rows.iter().map(id).max().unwrap_or(0) + 1
    }

    fn account_by_id(&self, id: i64) -> Option<Account> {
        self.accounts.iter().find(|a| a.id == id).cloned()
    }

    fn account_by_email(&self, email: &str) -> Option<Account> {
        self.accounts.iter().find(|a| a.email == email).cloned()
    }

    fn insert_account(&mut self, account: NewAccount) -> Result<Account, PeopleServiceError> {
        if self.account_by_email(&account.email).is_some() {
            return Err(anyhow!("duplicate email {}", account.email).into());
        }
        let now = Utc::now();
        let account = Account {
            id: Self::next_id(&self.accounts, |a| a.id),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.accounts.push(account.clone());
        Ok(account)
    }

    fn patch_account(&mut self, id: i64, patch: AccountPatch) -> Result<Account, PeopleServiceError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(PeopleServiceError::AccountNotFound)?;
        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(email) = patch.email {
            account.email = email;
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    fn grant(&mut self, account_id: i64, role: RoleName) {
        if !self.roles.contains(&(account_id, role)) {
            self.roles.push((account_id, role));
        }
    }

    fn roles(&self, account_id: i64) -> Vec<RoleName> {
        self.roles
            .iter()
            .filter(|(id, _)| *id == account_id)
            .map(|(_, role)| *role)
            .collect()
    }

    fn employee(&self, id: i64, include_deleted: bool) -> Option<EmployeeRecord> {
        self.employees
            .iter()
            .find(|e| e.id == id && (include_deleted || e.is_active()))
            .cloned()
    }

    fn employee_by_account(&self, account_id: i64, include_deleted: bool) -> Option<EmployeeRecord> {
        self.employees
            .iter()
            .find(|e| e.account_id == account_id && (include_deleted || e.is_active()))
            .cloned()
    }

    fn insert_employee(
        &mut self,
        account_id: i64,
        fields: EmployeeFields,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        if self.fail_employee_writes {
            return Err(anyhow!("employee insert failed").into());
        }
        // Mirrors the unique index on employees.user_id.
        if self.employees.iter().any(|e| e.account_id == account_id) {
            return Err(anyhow!("duplicate employee for account {account_id}").into());
        }
        let now = Utc::now();
        let record = EmployeeRecord {
            id: Self::next_id(&self.employees, |e| e.id),
            account_id,
            department_id: fields.department_id,
            position: fields.position,
            salary: fields.salary,
            hire_date: fields.hire_date,
            contact: fields.contact,
            status: fields.status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.employees.push(record.clone());
        Ok(record)
    }

    fn change_employee(
        &mut self,
        id: i64,
        changes: EmployeeChanges,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        if self.fail_employee_writes {
            return Err(anyhow!("employee update failed").into());
        }
        let record = self
            .employees
            .iter_mut()
            .find(|e| e.id == id && e.is_active())
            .ok_or(PeopleServiceError::EmployeeNotFound)?;
        if let Some(v) = changes.department_id {
            record.department_id = v;
        }
        if let Some(v) = changes.position {
            record.position = v;
        }
        if let Some(v) = changes.salary {
            record.salary = v;
        }
        if let Some(v) = changes.hire_date {
            record.hire_date = v;
        }
        if let Some(v) = changes.status {
            record.status = v;
        }
        if let Some(v) = changes.phone {
            record.contact.phone = v;
        }
        if let Some(v) = changes.address {
            record.contact.address = v;
        }
        if let Some(v) = changes.city {
            record.contact.city = v;
        }
        if let Some(v) = changes.country {
            record.contact.country = v;
        }
        if let Some(v) = changes.postal_code {
            record.contact.postal_code = v;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn mark_deleted(&mut self, id: i64, deleted: bool) -> Result<(), PeopleServiceError> {
        let record = self
            .employees
            .iter_mut()
            .find(|e| e.id == id && e.is_active() == deleted)
            .ok_or(PeopleServiceError::EmployeeNotFound)?;
        record.deleted_at = deleted.then(Utc::now);
        Ok(())
    }

    fn department_view(&self, department: &Department) -> DepartmentView {
        DepartmentView {
            department: department.clone(),
            manager: department
                .manager_id
                .and_then(|id| self.account_by_id(id))
                .map(|a| a.summary()),
            employees_count: self
                .employees
                .iter()
                .filter(|e| e.department_id == department.id && e.is_active())
                .count() as u64,
        }
    }

    fn employee_view(&self, record: &EmployeeRecord) -> Option<EmployeeView> {
        let account: AccountSummary = self.account_by_id(record.account_id)?.summary();
        let department = self
            .departments
            .iter()
            .find(|d| d.id == record.department_id)
            .map(|d| DepartmentSummary {
                id: d.id,
                name: d.name.clone(),
                description: d.description.clone(),
            });
        Some(EmployeeView {
            record: record.clone(),
            account,
            department,
        })
    }
}

fn paginate<T: Clone>(rows: &[T], page: PageRequest) -> Page<T> {
    let start = page.offset() as usize;
    let data = rows
        .iter()
        .skip(start)
        .take(page.per_page as usize)
        .cloned()
        .collect();
    Page::new(data, page, rows.len() as u64)
}

// ── Store impls ──────────────────────────────────────────────────────────────

/// Implements the write-side store traits for a type exposing `with(|snapshot| ..)`.
macro_rules! impl_write_stores {
    ($ty:ty) => {
        impl AccountStore for $ty {
            async fn find_by_id(&self, id: i64) -> Result<Option<Account>, PeopleServiceError> {
                Ok(self.with(|s| s.account_by_id(id)))
            }

            async fn find_by_email(
                &self,
                email: &str,
            ) -> Result<Option<Account>, PeopleServiceError> {
                Ok(self.with(|s| s.account_by_email(email)))
            }

            async fn create(&self, account: NewAccount) -> Result<Account, PeopleServiceError> {
                self.with(|s| s.insert_account(account))
            }

            async fn update(
                &self,
                id: i64,
                patch: AccountPatch,
            ) -> Result<Account, PeopleServiceError> {
                self.with(|s| s.patch_account(id, patch))
            }
        }

        impl RoleAssignment for $ty {
            async fn assign_default_role(&self, account_id: i64) -> Result<(), PeopleServiceError> {
                self.with(|s| s.grant(account_id, RoleName::DEFAULT));
                Ok(())
            }

            async fn assign_role(
                &self,
                account_id: i64,
                role: RoleName,
            ) -> Result<(), PeopleServiceError> {
                self.with(|s| s.grant(account_id, role));
                Ok(())
            }

            async fn roles_of(&self, account_id: i64) -> Result<Vec<RoleName>, PeopleServiceError> {
                Ok(self.with(|s| s.roles(account_id)))
            }
        }

        impl EmployeeStore for $ty {
            async fn find_by_id(
                &self,
                id: i64,
            ) -> Result<Option<EmployeeRecord>, PeopleServiceError> {
                Ok(self.with(|s| s.employee(id, false)))
            }

            async fn find_by_account_id(
                &self,
                account_id: i64,
                include_deleted: bool,
            ) -> Result<Option<EmployeeRecord>, PeopleServiceError> {
                Ok(self.with(|s| s.employee_by_account(account_id, include_deleted)))
            }

            async fn create(
                &self,
                account_id: i64,
                fields: EmployeeFields,
            ) -> Result<EmployeeRecord, PeopleServiceError> {
                self.with(|s| s.insert_employee(account_id, fields))
            }

            async fn update(
                &self,
                id: i64,
                changes: EmployeeChanges,
            ) -> Result<EmployeeRecord, PeopleServiceError> {
                self.with(|s| s.change_employee(id, changes))
            }

            async fn soft_delete(&self, id: i64) -> Result<(), PeopleServiceError> {
                self.with(|s| s.mark_deleted(id, true))
            }

            async fn restore(&self, id: i64) -> Result<(), PeopleServiceError> {
                self.with(|s| s.mark_deleted(id, false))
            }
        }
    };
}

// ── MemoryDb ─────────────────────────────────────────────────────────────────

/// Shared in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    pub state: Arc<Mutex<Snapshot>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with(|s| s.clone())
    }

    pub fn seed_account(&self, id: i64, name: &str, email: &str) -> Account {
        let now = Utc::now();
        let account = Account {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: hrm_people::usecase::credential::hash_password("secret123").unwrap(),
            created_at: now,
            updated_at: now,
        };
        self.with(|s| s.accounts.push(account.clone()));
        account
    }

    pub fn seed_department(&self, id: i64, name: &str) -> Department {
        let now = Utc::now();
        let department = Department {
            id,
            name: name.to_owned(),
            description: None,
            manager_id: None,
            created_at: now,
            updated_at: now,
        };
        self.with(|s| s.departments.push(department.clone()));
        department
    }

    pub fn fail_employee_writes(&self) {
        self.with(|s| s.fail_employee_writes = true);
    }
}

impl_write_stores!(MemoryDb);

impl TransactionScope for MemoryDb {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, PeopleServiceError> {
        Ok(MemoryTx {
            shared: Arc::clone(&self.state),
            work: Mutex::new(self.snapshot()),
        })
    }
}

impl EmployeeDirectory for MemoryDb {
    async fn list(&self, page: PageRequest) -> Result<Page<EmployeeView>, PeopleServiceError> {
        let views: Vec<EmployeeView> = self.with(|s| {
            let mut active: Vec<_> = s.employees.iter().filter(|e| e.is_active()).collect();
            active.sort_by_key(|e| e.id);
            active.into_iter().filter_map(|e| s.employee_view(e)).collect()
        });
        Ok(paginate(&views, page))
    }

    async fn get(&self, id: i64) -> Result<Option<EmployeeView>, PeopleServiceError> {
        Ok(self.with(|s| s.employee(id, false).and_then(|e| s.employee_view(&e))))
    }
}

impl DepartmentRepository for MemoryDb {
    async fn list(&self, page: PageRequest) -> Result<Page<DepartmentView>, PeopleServiceError> {
        let views: Vec<DepartmentView> =
            self.with(|s| s.departments.iter().map(|d| s.department_view(d)).collect());
        Ok(paginate(&views, page))
    }

    async fn get(&self, id: i64) -> Result<Option<DepartmentView>, PeopleServiceError> {
        Ok(self.with(|s| {
            s.departments
                .iter()
                .find(|d| d.id == id)
                .map(|d| s.department_view(d))
        }))
    }

    async fn exists(&self, id: i64) -> Result<bool, PeopleServiceError> {
        Ok(self.with(|s| s.departments.iter().any(|d| d.id == id)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, PeopleServiceError> {
        Ok(self.with(|s| s.departments.iter().find(|d| d.name == name).cloned()))
    }

    async fn create(&self, department: NewDepartment) -> Result<Department, PeopleServiceError> {
        Ok(self.with(|s| {
            let now = Utc::now();
            let department = Department {
                id: Snapshot::next_id(&s.departments, |d| d.id),
                name: department.name,
                description: department.description,
                manager_id: department.manager_id,
                created_at: now,
                updated_at: now,
            };
            s.departments.push(department.clone());
            department
        }))
    }

    async fn update(
        &self,
        id: i64,
        patch: DepartmentPatch,
    ) -> Result<Department, PeopleServiceError> {
        self.with(|s| {
            let department = s
                .departments
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or(PeopleServiceError::DepartmentNotFound)?;
            if let Some(name) = patch.name {
                department.name = name;
            }
            if let Some(description) = patch.description {
                department.description = description;
            }
            if let Some(manager_id) = patch.manager_id {
                department.manager_id = manager_id;
            }
            department.updated_at = Utc::now();
            Ok(department.clone())
        })
    }

    async fn count_employee_rows(&self, id: i64) -> Result<u64, PeopleServiceError> {
        Ok(self.with(|s| s.employees.iter().filter(|e| e.department_id == id).count() as u64))
    }

    async fn delete(&self, id: i64) -> Result<bool, PeopleServiceError> {
        Ok(self.with(|s| {
            let before = s.departments.len();
            s.departments.retain(|d| d.id != id);
            s.departments.len() != before
        }))
    }
}

// ── MemoryTx ─────────────────────────────────────────────────────────────────

/// Works on a private copy; `commit` publishes it, dropping discards it.
pub struct MemoryTx {
    shared: Arc<Mutex<Snapshot>>,
    work: Mutex<Snapshot>,
}

impl MemoryTx {
    fn with<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> R {
        f(&mut self.work.lock().unwrap())
    }
}

impl_write_stores!(MemoryTx);

impl UnitOfWork for MemoryTx {
    async fn commit(self) -> Result<(), PeopleServiceError> {
        let work = self.work.into_inner().unwrap();
        *self.shared.lock().unwrap() = work;
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn employee_fields(department_id: i64, position: &str, salary: i64) -> EmployeeFields {
    EmployeeFields {
        department_id,
        position: position.to_owned(),
        salary: Decimal::new(salary, 0),
        hire_date: date(2024, 1, 1),
        status: EmployeeStatus::Active,
        contact: ContactFields::default(),
    }
}
