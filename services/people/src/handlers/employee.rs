use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hrm_auth_types::identity::Identity;
use hrm_domain::employee::EmployeeStatus;
use hrm_domain::pagination::Page;
use hrm_domain::role::{Action, Permission, Resource};

use crate::domain::types::{
    AccountFields, AccountPatch, AccountSummary, ContactFields, DepartmentSummary,
    EmployeeChanges, EmployeeFields, EmployeeView,
};
use crate::error::PeopleServiceError;
use crate::handlers::{MessageResponse, field_rules, json_body, page_query};
use crate::state::AppState;
use crate::usecase::employee::{
    AccountRef, CreateEmployeeInput, CreateEmployeeUseCase, DeleteEmployeeUseCase,
    GetEmployeeUseCase, ListEmployeesUseCase, UpdateEmployeeInput, UpdateEmployeeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<AccountSummary> for AccountResponse {
    fn from(a: AccountSummary) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
        }
    }
}

#[derive(Serialize)]
pub struct DepartmentRef {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<DepartmentSummary> for DepartmentRef {
    fn from(d: DepartmentSummary) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
        }
    }
}

#[derive(Serialize)]
pub struct EmployeeResponse {
    pub id: i64,
    pub user_id: i64,
    pub department_id: i64,
    pub position: String,
    pub salary: Decimal,
    pub hire_date: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub status: EmployeeStatus,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub user: AccountResponse,
    pub department: Option<DepartmentRef>,
}

impl From<EmployeeView> for EmployeeResponse {
    fn from(view: EmployeeView) -> Self {
        let record = view.record;
        Self {
            id: record.id,
            user_id: record.account_id,
            department_id: record.department_id,
            position: record.position,
            salary: record.salary,
            hire_date: record.hire_date,
            phone: record.contact.phone,
            address: record.contact.address,
            city: record.contact.city,
            country: record.contact.country,
            postal_code: record.contact.postal_code,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            user: view.account.into(),
            department: view.department.map(Into::into),
        }
    }
}

// ── Request bodies ───────────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[serde(alias = "account_id")]
    pub user_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(alias = "display_email")]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
    pub department_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub position: Option<String>,
    #[serde(alias = "compensation")]
    pub salary: Option<Decimal>,
    #[serde(alias = "join_date")]
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
}

impl CreateEmployeeRequest {
    /// Without `user_id` the account is found or provisioned from `name` + `email`.
    pub fn into_input(self) -> Result<CreateEmployeeInput, PeopleServiceError> {
        let mut errors = field_rules(&self);
        let account = match self.user_id {
            Some(id) => Some(AccountRef::Existing(id)),
            None => {
                let name = errors.required("name", self.name);
                let email = errors.required("email", self.email);
                name.zip(email).map(|(name, email)| {
                    AccountRef::Provision(AccountFields {
                        name,
                        email,
                        password: self.password,
                    })
                })
            }
        };
        let department_id = errors.required("department_id", self.department_id);
        let position = errors.required("position", self.position);
        let salary = errors.required("salary", self.salary);
        let hire_date = errors.required("hire_date", self.hire_date);
        let status = errors.required("status", self.status);
        if salary.is_some_and(|s| s < Decimal::ZERO) {
            errors.add("salary", "must be at least 0");
        }

        let (
            Some(account),
            Some(department_id),
            Some(position),
            Some(salary),
            Some(hire_date),
            Some(status),
        ) = (account, department_id, position, salary, hire_date, status)
        else {
            return Err(PeopleServiceError::Validation(errors));
        };
        errors.into_result()?;

        Ok(CreateEmployeeInput {
            account,
            employee: EmployeeFields {
                department_id,
                position,
                salary,
                hire_date,
                status,
                contact: ContactFields {
                    phone: self.phone,
                    address: self.address,
                    city: self.city,
                    country: self.country,
                    postal_code: self.postal_code,
                },
            },
        })
    }
}

/// Partial update. Contact fields accept `null` to clear the stored value.
#[derive(Deserialize, Validate, Default)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(alias = "display_email")]
    #[validate(email)]
    pub email: Option<String>,
    pub department_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub position: Option<String>,
    #[serde(alias = "compensation")]
    pub salary: Option<Decimal>,
    #[serde(alias = "join_date")]
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub postal_code: Option<Option<String>>,
}

impl UpdateEmployeeRequest {
    pub fn into_input(self) -> Result<UpdateEmployeeInput, PeopleServiceError> {
        let mut errors = field_rules(&self);
        if self.salary.is_some_and(|s| s < Decimal::ZERO) {
            errors.add("salary", "must be at least 0");
        }
        for (field, value, max) in [
            ("phone", &self.phone, 20),
            ("city", &self.city, 100),
            ("country", &self.country, 100),
            ("postal_code", &self.postal_code, 20),
        ] {
            if let Some(Some(value)) = value {
                if value.chars().count() > max {
                    errors.add(field, format!("may not be greater than {max} characters"));
                }
            }
        }
        errors.into_result()?;

        Ok(UpdateEmployeeInput {
            account: AccountPatch {
                name: self.name,
                email: self.email,
            },
            employee: EmployeeChanges {
                department_id: self.department_id,
                position: self.position,
                salary: self.salary,
                hire_date: self.hire_date,
                status: self.status,
                phone: self.phone,
                address: self.address,
                city: self.city,
                country: self.country,
                postal_code: self.postal_code,
            },
        })
    }
}

// ── GET /api/employees ───────────────────────────────────────────────────────

pub async fn list_employees(
    identity: Identity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<EmployeeResponse>>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Employee))?;
    let page = page_query(raw_query)?;
    let uc = ListEmployeesUseCase {
        repo: state.employee_directory(),
    };
    let employees = uc.execute(page).await?;
    Ok(Json(employees.map(EmployeeResponse::from)))
}

// ── GET /api/employees/{id} ──────────────────────────────────────────────────

pub async fn get_employee(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EmployeeResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Employee))?;
    let view = load_employee(&state, id).await?;
    Ok(Json(view.into()))
}

// ── POST /api/employees ──────────────────────────────────────────────────────

pub async fn create_employee(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EmployeeResponse>), PeopleServiceError> {
    identity.require(Permission::new(Action::Create, Resource::Employee))?;
    let input = json_body(payload)?.into_input()?;
    let uc = CreateEmployeeUseCase {
        accounts: state.account_store(),
        employees: state.employee_store(),
        departments: state.department_repo(),
        scope: state.transaction_scope(),
    };
    let record = uc.execute(input).await?;
    let view = load_employee(&state, record.id).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

// ── PUT /api/employees/{id} ──────────────────────────────────────────────────

pub async fn update_employee(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateEmployeeRequest>, JsonRejection>,
) -> Result<Json<EmployeeResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Update, Resource::Employee))?;
    let input = json_body(payload)?.into_input()?;
    let uc = UpdateEmployeeUseCase {
        accounts: state.account_store(),
        employees: state.employee_store(),
        departments: state.department_repo(),
        scope: state.transaction_scope(),
    };
    let record = uc.execute(id, input).await?;
    let view = load_employee(&state, record.id).await?;
    Ok(Json(view.into()))
}

// ── DELETE /api/employees/{id} ───────────────────────────────────────────────

pub async fn delete_employee(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Delete, Resource::Employee))?;
    let uc = DeleteEmployeeUseCase {
        scope: state.transaction_scope(),
    };
    uc.execute(id).await?;
    Ok(Json(MessageResponse::DELETED))
}

async fn load_employee(state: &AppState, id: i64) -> Result<EmployeeView, PeopleServiceError> {
    let uc = GetEmployeeUseCase {
        repo: state.employee_directory(),
    };
    uc.execute(id).await
}
