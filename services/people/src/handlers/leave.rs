use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hrm_auth_types::identity::Identity;
use hrm_domain::leave::{LeaveStatus, LeaveType};
use hrm_domain::pagination::Page;
use hrm_domain::role::{Action, Permission, Resource};

use crate::domain::types::{Leave, LeavePatch, NewLeave};
use crate::error::PeopleServiceError;
use crate::handlers::{MessageResponse, field_rules, json_body, page_query};
use crate::state::AppState;
use crate::usecase::leave::{
    CreateLeaveUseCase, DeleteLeaveUseCase, GetLeaveUseCase, ListLeavesUseCase,
    UpdateLeaveUseCase,
};

#[derive(Serialize)]
pub struct LeaveResponse {
    pub id: i64,
    pub employee_id: i64,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub approved_by: Option<i64>,
    pub approval_date: Option<NaiveDate>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Leave> for LeaveResponse {
    fn from(l: Leave) -> Self {
        Self {
            id: l.id,
            employee_id: l.employee_id,
            leave_type: l.leave_type,
            start_date: l.start_date,
            end_date: l.end_date,
            reason: l.reason,
            status: l.status,
            approved_by: l.approved_by,
            approval_date: l.approval_date,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateLeaveRequest {
    pub employee_id: Option<i64>,
    #[serde(rename = "type")]
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub reason: Option<String>,
    pub status: Option<LeaveStatus>,
    pub approved_by: Option<i64>,
    pub approval_date: Option<NaiveDate>,
}

impl CreateLeaveRequest {
    pub fn into_input(self) -> Result<NewLeave, PeopleServiceError> {
        let mut errors = field_rules(&self);
        let employee_id = errors.required("employee_id", self.employee_id);
        let leave_type = errors.required("type", self.leave_type);
        let start_date = errors.required("start_date", self.start_date);
        let end_date = errors.required("end_date", self.end_date);
        let reason = errors.required("reason", self.reason);
        let (Some(employee_id), Some(leave_type), Some(start_date), Some(end_date), Some(reason)) =
            (employee_id, leave_type, start_date, end_date, reason)
        else {
            return Err(PeopleServiceError::Validation(errors));
        };
        errors.into_result()?;
        Ok(NewLeave {
            employee_id,
            leave_type,
            start_date,
            end_date,
            reason,
            status: self.status.unwrap_or_default(),
            approved_by: self.approved_by,
            approval_date: self.approval_date,
        })
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdateLeaveRequest {
    #[serde(rename = "type")]
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub reason: Option<String>,
    pub status: Option<LeaveStatus>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub approved_by: Option<Option<i64>>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub approval_date: Option<Option<NaiveDate>>,
}

impl UpdateLeaveRequest {
    pub fn into_patch(self) -> Result<LeavePatch, PeopleServiceError> {
        field_rules(&self).into_result()?;
        Ok(LeavePatch {
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
            status: self.status,
            approved_by: self.approved_by,
            approval_date: self.approval_date,
        })
    }
}

pub async fn list_leaves(
    identity: Identity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<LeaveResponse>>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Leave))?;
    let page = page_query(raw_query)?;
    let uc = ListLeavesUseCase {
        repo: state.leave_repo(),
    };
    let leaves = uc.execute(page).await?;
    Ok(Json(leaves.map(LeaveResponse::from)))
}

pub async fn get_leave(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LeaveResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Leave))?;
    let uc = GetLeaveUseCase {
        repo: state.leave_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

pub async fn create_leave(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<CreateLeaveRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LeaveResponse>), PeopleServiceError> {
    identity.require(Permission::new(Action::Create, Resource::Leave))?;
    let input = json_body(payload)?.into_input()?;
    let uc = CreateLeaveUseCase {
        repo: state.leave_repo(),
        employees: state.employee_store(),
        accounts: state.account_store(),
    };
    let leave = uc.execute(input).await?;
    Ok((StatusCode::CREATED, Json(leave.into())))
}

pub async fn update_leave(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateLeaveRequest>, JsonRejection>,
) -> Result<Json<LeaveResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Update, Resource::Leave))?;
    let patch = json_body(payload)?.into_patch()?;
    let uc = UpdateLeaveUseCase {
        repo: state.leave_repo(),
        accounts: state.account_store(),
    };
    Ok(Json(uc.execute(id, patch).await?.into()))
}

pub async fn delete_leave(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Delete, Resource::Leave))?;
    let uc = DeleteLeaveUseCase {
        repo: state.leave_repo(),
    };
    uc.execute(id).await?;
    Ok(Json(MessageResponse::DELETED))
}
