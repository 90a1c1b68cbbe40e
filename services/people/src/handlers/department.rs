use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hrm_auth_types::identity::Identity;
use hrm_domain::pagination::Page;
use hrm_domain::role::{Action, Permission, Resource};

use crate::domain::types::{DepartmentPatch, DepartmentView, NewDepartment};
use crate::error::PeopleServiceError;
use crate::handlers::employee::AccountResponse;
use crate::handlers::{MessageResponse, field_rules, json_body, page_query};
use crate::state::AppState;
use crate::usecase::department::{
    CreateDepartmentUseCase, DeleteDepartmentUseCase, GetDepartmentUseCase,
    ListDepartmentsUseCase, UpdateDepartmentUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DepartmentResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<i64>,
    pub employees_count: u64,
    pub manager: Option<AccountResponse>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<DepartmentView> for DepartmentResponse {
    fn from(view: DepartmentView) -> Self {
        let d = view.department;
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            manager_id: d.manager_id,
            employees_count: view.employees_count,
            manager: view.manager.map(Into::into),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

// ── Request bodies ───────────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub manager_id: Option<i64>,
}

impl CreateDepartmentRequest {
    pub fn into_input(self) -> Result<NewDepartment, PeopleServiceError> {
        let mut errors = field_rules(&self);
        let Some(name) = errors.required("name", self.name) else {
            return Err(PeopleServiceError::Validation(errors));
        };
        errors.into_result()?;
        Ok(NewDepartment {
            name,
            description: self.description,
            manager_id: self.manager_id,
        })
    }
}

/// `description` and `manager_id` accept `null` to clear them.
#[derive(Deserialize, Validate)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub manager_id: Option<Option<i64>>,
}

impl UpdateDepartmentRequest {
    pub fn into_patch(self) -> Result<DepartmentPatch, PeopleServiceError> {
        field_rules(&self).into_result()?;
        Ok(DepartmentPatch {
            name: self.name,
            description: self.description,
            manager_id: self.manager_id,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

pub async fn list_departments(
    identity: Identity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<DepartmentResponse>>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Department))?;
    let page = page_query(raw_query)?;
    let uc = ListDepartmentsUseCase {
        repo: state.department_repo(),
    };
    let departments = uc.execute(page).await?;
    Ok(Json(departments.map(DepartmentResponse::from)))
}

pub async fn get_department(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DepartmentResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Department))?;
    Ok(Json(load_department(&state, id).await?.into()))
}

pub async fn create_department(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<CreateDepartmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DepartmentResponse>), PeopleServiceError> {
    identity.require(Permission::new(Action::Create, Resource::Department))?;
    let input = json_body(payload)?.into_input()?;
    let uc = CreateDepartmentUseCase {
        repo: state.department_repo(),
        accounts: state.account_store(),
    };
    let department = uc.execute(input).await?;
    let view = load_department(&state, department.id).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

pub async fn update_department(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateDepartmentRequest>, JsonRejection>,
) -> Result<Json<DepartmentResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Update, Resource::Department))?;
    let patch = json_body(payload)?.into_patch()?;
    let uc = UpdateDepartmentUseCase {
        repo: state.department_repo(),
        accounts: state.account_store(),
    };
    uc.execute(id, patch).await?;
    Ok(Json(load_department(&state, id).await?.into()))
}

pub async fn delete_department(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Delete, Resource::Department))?;
    let uc = DeleteDepartmentUseCase {
        repo: state.department_repo(),
    };
    uc.execute(id).await?;
    Ok(Json(MessageResponse::DELETED))
}

async fn load_department(state: &AppState, id: i64) -> Result<DepartmentView, PeopleServiceError> {
    let uc = GetDepartmentUseCase {
        repo: state.department_repo(),
    };
    uc.execute(id).await
}
