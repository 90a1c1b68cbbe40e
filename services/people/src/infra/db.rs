use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel as _, QueryFilter, QueryOrder,
    TransactionTrait,
};

use hrm_domain::employee::EmployeeStatus;
use hrm_domain::role::RoleName;
use hrm_people_schema::{account_roles, employees, users};

use crate::domain::repository::{
    AccountStore, EmployeeStore, RoleAssignment, TransactionScope, UnitOfWork,
};
use crate::domain::types::{
    Account, AccountPatch, ContactFields, EmployeeChanges, EmployeeFields, EmployeeRecord,
    NewAccount,
};
use crate::error::PeopleServiceError;

// Queries are written once against `ConnectionTrait` and shared by the
// pooled stores and the transaction-bound unit of work.

// ── Account queries ──────────────────────────────────────────────────────────

async fn find_account_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<Account>, PeopleServiceError> {
    let model = users::Entity::find_by_id(id)
        .one(conn)
        .await
        .context("find account by id")?;
    Ok(model.map(account_from_model))
}

async fn find_account_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<Option<Account>, PeopleServiceError> {
    let model = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await
        .context("find account by email")?;
    Ok(model.map(account_from_model))
}

async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    account: NewAccount,
) -> Result<Account, PeopleServiceError> {
    let now = Utc::now();
    let model = users::ActiveModel {
        name: Set(account.name),
        email: Set(account.email),
        password: Set(account.password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .context("create account")?;
    Ok(account_from_model(model))
}

async fn update_account<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    patch: AccountPatch,
) -> Result<Account, PeopleServiceError> {
    let model = users::Entity::find_by_id(id)
        .one(conn)
        .await
        .context("find account for update")?
        .ok_or(PeopleServiceError::AccountNotFound)?;
    let mut am = model.into_active_model();
    if let Some(name) = patch.name {
        am.name = Set(name);
    }
    if let Some(email) = patch.email {
        am.email = Set(email);
    }
    am.updated_at = Set(Utc::now());
    let model = am.update(conn).await.context("update account")?;
    Ok(account_from_model(model))
}

fn account_from_model(model: users::Model) -> Account {
    Account {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Role queries ─────────────────────────────────────────────────────────────

async fn grant_role<C: ConnectionTrait>(
    conn: &C,
    account_id: i64,
    role: RoleName,
) -> Result<(), PeopleServiceError> {
    let held = account_roles::Entity::find_by_id((account_id, role.as_str().to_owned()))
        .one(conn)
        .await
        .context("find role grant")?;
    if held.is_some() {
        return Ok(());
    }
    account_roles::Entity::insert(account_roles::ActiveModel {
        user_id: Set(account_id),
        role: Set(role.as_str().to_owned()),
    })
    .exec_without_returning(conn)
    .await
    .context("grant role")?;
    Ok(())
}

async fn list_roles<C: ConnectionTrait>(
    conn: &C,
    account_id: i64,
) -> Result<Vec<RoleName>, PeopleServiceError> {
    let rows = account_roles::Entity::find()
        .filter(account_roles::Column::UserId.eq(account_id))
        .order_by_asc(account_roles::Column::Role)
        .all(conn)
        .await
        .context("list roles")?;
    let roles = rows
        .into_iter()
        .map(|row| row.role.parse::<RoleName>().context("parse stored role"))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(roles)
}

// ── Employee queries ─────────────────────────────────────────────────────────

async fn find_employee_row<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    include_deleted: bool,
) -> Result<Option<employees::Model>, PeopleServiceError> {
    let mut query = employees::Entity::find_by_id(id);
    if !include_deleted {
        query = query.filter(employees::Column::DeletedAt.is_null());
    }
    let model = query.one(conn).await.context("find employee by id")?;
    Ok(model)
}

async fn find_employee_by_account<C: ConnectionTrait>(
    conn: &C,
    account_id: i64,
    include_deleted: bool,
) -> Result<Option<EmployeeRecord>, PeopleServiceError> {
    let mut query = employees::Entity::find().filter(employees::Column::UserId.eq(account_id));
    if !include_deleted {
        query = query.filter(employees::Column::DeletedAt.is_null());
    }
    let model = query
        .one(conn)
        .await
        .context("find employee by account id")?;
    model.map(employee_from_model).transpose()
}

async fn insert_employee<C: ConnectionTrait>(
    conn: &C,
    account_id: i64,
    fields: EmployeeFields,
) -> Result<EmployeeRecord, PeopleServiceError> {
    let now = Utc::now();
    let ContactFields {
        phone,
        address,
        city,
        country,
        postal_code,
    } = fields.contact;
    let model = employees::ActiveModel {
        user_id: Set(account_id),
        department_id: Set(fields.department_id),
        position: Set(fields.position),
        salary: Set(fields.salary),
        hire_date: Set(fields.hire_date),
        phone: Set(phone),
        address: Set(address),
        city: Set(city),
        country: Set(country),
        postal_code: Set(postal_code),
        status: Set(fields.status.as_str().to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await
    .context("create employee")?;
    employee_from_model(model)
}

async fn update_employee<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    changes: EmployeeChanges,
) -> Result<EmployeeRecord, PeopleServiceError> {
    let model = find_employee_row(conn, id, false)
        .await?
        .ok_or(PeopleServiceError::EmployeeNotFound)?;
    let mut am = model.into_active_model();
    if let Some(department_id) = changes.department_id {
        am.department_id = Set(department_id);
    }
    if let Some(position) = changes.position {
        am.position = Set(position);
    }
    if let Some(salary) = changes.salary {
        am.salary = Set(salary);
    }
    if let Some(hire_date) = changes.hire_date {
        am.hire_date = Set(hire_date);
    }
    if let Some(status) = changes.status {
        am.status = Set(status.as_str().to_owned());
    }
    if let Some(phone) = changes.phone {
        am.phone = Set(phone);
    }
    if let Some(address) = changes.address {
        am.address = Set(address);
    }
    if let Some(city) = changes.city {
        am.city = Set(city);
    }
    if let Some(country) = changes.country {
        am.country = Set(country);
    }
    if let Some(postal_code) = changes.postal_code {
        am.postal_code = Set(postal_code);
    }
    am.updated_at = Set(Utc::now());
    let model = am.update(conn).await.context("update employee")?;
    employee_from_model(model)
}

/// Set or clear `deleted_at`. Fails with `EmployeeNotFound` when the row is
/// missing or already in the requested state.
async fn set_employee_deleted<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    deleted: bool,
) -> Result<(), PeopleServiceError> {
    let model = find_employee_row(conn, id, true)
        .await?
        .filter(|m| m.deleted_at.is_some() != deleted)
        .ok_or(PeopleServiceError::EmployeeNotFound)?;
    let now = Utc::now();
    let mut am = model.into_active_model();
    am.deleted_at = Set(deleted.then_some(now));
    am.updated_at = Set(now);
    am.update(conn)
        .await
        .context(if deleted {
            "soft-delete employee"
        } else {
            "restore employee"
        })?;
    Ok(())
}

pub(crate) fn employee_from_model(
    model: employees::Model,
) -> Result<EmployeeRecord, PeopleServiceError> {
    let status = model
        .status
        .parse::<EmployeeStatus>()
        .context("parse stored employee status")?;
    Ok(EmployeeRecord {
        id: model.id,
        account_id: model.user_id,
        department_id: model.department_id,
        position: model.position,
        salary: model.salary,
        hire_date: model.hire_date,
        contact: ContactFields {
            phone: model.phone,
            address: model.address,
            city: model.city,
            country: model.country,
            postal_code: model.postal_code,
        },
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    })
}

// ── Account store ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountStore {
    pub db: DatabaseConnection,
}

impl AccountStore for DbAccountStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, PeopleServiceError> {
        find_account_by_id(&self.db, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, PeopleServiceError> {
        find_account_by_email(&self.db, email).await
    }

    async fn create(&self, account: NewAccount) -> Result<Account, PeopleServiceError> {
        insert_account(&self.db, account).await
    }

    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account, PeopleServiceError> {
        update_account(&self.db, id, patch).await
    }
}

impl RoleAssignment for DbAccountStore {
    async fn assign_default_role(&self, account_id: i64) -> Result<(), PeopleServiceError> {
        grant_role(&self.db, account_id, RoleName::DEFAULT).await
    }

    async fn assign_role(&self, account_id: i64, role: RoleName) -> Result<(), PeopleServiceError> {
        grant_role(&self.db, account_id, role).await
    }

    async fn roles_of(&self, account_id: i64) -> Result<Vec<RoleName>, PeopleServiceError> {
        list_roles(&self.db, account_id).await
    }
}

// ── Employee store ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEmployeeStore {
    pub db: DatabaseConnection,
}

impl EmployeeStore for DbEmployeeStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeRecord>, PeopleServiceError> {
        find_employee_row(&self.db, id, false)
            .await?
            .map(employee_from_model)
            .transpose()
    }

    async fn find_by_account_id(
        &self,
        account_id: i64,
        include_deleted: bool,
    ) -> Result<Option<EmployeeRecord>, PeopleServiceError> {
        find_employee_by_account(&self.db, account_id, include_deleted).await
    }

    async fn create(
        &self,
        account_id: i64,
        fields: EmployeeFields,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        insert_employee(&self.db, account_id, fields).await
    }

    async fn update(
        &self,
        id: i64,
        changes: EmployeeChanges,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        update_employee(&self.db, id, changes).await
    }

    async fn soft_delete(&self, id: i64) -> Result<(), PeopleServiceError> {
        set_employee_deleted(&self.db, id, true).await
    }

    async fn restore(&self, id: i64) -> Result<(), PeopleServiceError> {
        set_employee_deleted(&self.db, id, false).await
    }
}

// ── Transaction scope ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTransactionScope {
    pub db: DatabaseConnection,
}

impl TransactionScope for DbTransactionScope {
    type Tx = DbUnitOfWork;

    async fn begin(&self) -> Result<DbUnitOfWork, PeopleServiceError> {
        let txn = self.db.begin().await.context("begin transaction")?;
        Ok(DbUnitOfWork { txn })
    }
}

/// Stores bound to one open transaction. sea-orm rolls the transaction back
/// when this is dropped uncommitted.
pub struct DbUnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork for DbUnitOfWork {
    async fn commit(self) -> Result<(), PeopleServiceError> {
        self.txn.commit().await.context("commit transaction")?;
        Ok(())
    }
}

impl AccountStore for DbUnitOfWork {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, PeopleServiceError> {
        find_account_by_id(&self.txn, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, PeopleServiceError> {
        find_account_by_email(&self.txn, email).await
    }

    async fn create(&self, account: NewAccount) -> Result<Account, PeopleServiceError> {
        insert_account(&self.txn, account).await
    }

    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account, PeopleServiceError> {
        update_account(&self.txn, id, patch).await
    }
}

impl RoleAssignment for DbUnitOfWork {
    async fn assign_default_role(&self, account_id: i64) -> Result<(), PeopleServiceError> {
        grant_role(&self.txn, account_id, RoleName::DEFAULT).await
    }

    async fn assign_role(&self, account_id: i64, role: RoleName) -> Result<(), PeopleServiceError> {
        grant_role(&self.txn, account_id, role).await
    }

    async fn roles_of(&self, account_id: i64) -> Result<Vec<RoleName>, PeopleServiceError> {
        list_roles(&self.txn, account_id).await
    }
}

impl EmployeeStore for DbUnitOfWork {
    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeRecord>, PeopleServiceError> {
        find_employee_row(&self.txn, id, false)
            .await?
            .map(employee_from_model)
            .transpose()
    }

    async fn find_by_account_id(
        &self,
        account_id: i64,
        include_deleted: bool,
    ) -> Result<Option<EmployeeRecord>, PeopleServiceError> {
        find_employee_by_account(&self.txn, account_id, include_deleted).await
    }

    async fn create(
        &self,
        account_id: i64,
        fields: EmployeeFields,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        insert_employee(&self.txn, account_id, fields).await
    }

    async fn update(
        &self,
        id: i64,
        changes: EmployeeChanges,
    ) -> Result<EmployeeRecord, PeopleServiceError> {
        update_employee(&self.txn, id, changes).await
    }

    async fn soft_delete(&self, id: i64) -> Result<(), PeopleServiceError> {
        set_employee_deleted(&self.txn, id, true).await
    }

    async fn restore(&self, id: i64) -> Result<(), PeopleServiceError> {
        set_employee_deleted(&self.txn, id, false).await
    }
}
