use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hrm_auth_types::identity::Identity;
use hrm_domain::attendance::AttendanceStatus;
use hrm_domain::pagination::Page;
use hrm_domain::role::{Action, Permission, Resource};

use crate::domain::types::{Attendance, AttendancePatch, NewAttendance};
use crate::error::{FieldErrors, PeopleServiceError};
use crate::handlers::{MessageResponse, json_body, page_query};
use crate::state::AppState;
use crate::usecase::attendance::{
    CreateAttendanceUseCase, DeleteAttendanceUseCase, GetAttendanceUseCase,
    ListAttendancesUseCase, UpdateAttendanceUseCase,
};

#[derive(Serialize)]
pub struct AttendanceResponse {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms_opt")]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms_opt")]
    pub check_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Attendance> for AttendanceResponse {
    fn from(a: Attendance) -> Self {
        Self {
            id: a.id,
            employee_id: a.employee_id,
            date: a.date,
            check_in: a.check_in,
            check_out: a.check_out,
            status: a.status,
            notes: a.notes,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateAttendanceRequest {
    pub employee_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

impl CreateAttendanceRequest {
    pub fn into_input(self) -> Result<NewAttendance, PeopleServiceError> {
        let mut errors = FieldErrors::new();
        let employee_id = errors.required("employee_id", self.employee_id);
        let date = errors.required("date", self.date);
        let status = errors.required("status", self.status);
        let (Some(employee_id), Some(date), Some(status)) = (employee_id, date, status) else {
            return Err(PeopleServiceError::Validation(errors));
        };
        Ok(NewAttendance {
            employee_id,
            date,
            check_in: self.check_in,
            check_out: self.check_out,
            status,
            notes: self.notes,
        })
    }
}

/// Only times, status and notes may change; the nullable ones accept `null`.
#[derive(Deserialize)]
pub struct UpdateAttendanceRequest {
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub check_in: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub check_out: Option<Option<DateTime<Utc>>>,
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "hrm_core::serde::nullable")]
    pub notes: Option<Option<String>>,
}

impl From<UpdateAttendanceRequest> for AttendancePatch {
    fn from(r: UpdateAttendanceRequest) -> Self {
        Self {
            check_in: r.check_in,
            check_out: r.check_out,
            status: r.status,
            notes: r.notes,
        }
    }
}

pub async fn list_attendances(
    identity: Identity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<AttendanceResponse>>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Attendance))?;
    let page = page_query(raw_query)?;
    let uc = ListAttendancesUseCase {
        repo: state.attendance_repo(),
    };
    let attendances = uc.execute(page).await?;
    Ok(Json(attendances.map(AttendanceResponse::from)))
}

pub async fn get_attendance(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AttendanceResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::View, Resource::Attendance))?;
    let uc = GetAttendanceUseCase {
        repo: state.attendance_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

pub async fn create_attendance(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<CreateAttendanceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AttendanceResponse>), PeopleServiceError> {
    identity.require(Permission::new(Action::Create, Resource::Attendance))?;
    let input = json_body(payload)?.into_input()?;
    let uc = CreateAttendanceUseCase {
        repo: state.attendance_repo(),
        employees: state.employee_store(),
    };
    let attendance = uc.execute(input).await?;
    Ok((StatusCode::CREATED, Json(attendance.into())))
}

pub async fn update_attendance(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateAttendanceRequest>, JsonRejection>,
) -> Result<Json<AttendanceResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Update, Resource::Attendance))?;
    let patch = AttendancePatch::from(json_body(payload)?);
    let uc = UpdateAttendanceUseCase {
        repo: state.attendance_repo(),
    };
    Ok(Json(uc.execute(id, patch).await?.into()))
}

pub async fn delete_attendance(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, PeopleServiceError> {
    identity.require(Permission::new(Action::Delete, Resource::Attendance))?;
    let uc = DeleteAttendanceUseCase {
        repo: state.attendance_repo(),
    };
    uc.execute(id).await?;
    Ok(Json(MessageResponse::DELETED))
}
