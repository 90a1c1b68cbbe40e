use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hrm_auth_types::identity::Forbidden;

/// People service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum PeopleServiceError {
    #[error("account not found")]
    AccountNotFound,
    #[error("employee not found")]
    EmployeeNotFound,
    #[error("department not found")]
    DepartmentNotFound,
    #[error("attendance not found")]
    AttendanceNotFound,
    #[error("leave not found")]
    LeaveNotFound,
    #[error("the given data was invalid")]
    Validation(FieldErrors),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden(#[from] Forbidden),
    #[error("department still has employees")]
    DepartmentInUse,
    /// An active employee is already linked to the resolved account. Upstream
    /// validation rejects this, so reaching it means a race or a validation gap.
    #[error("internal error")]
    ActiveEmployeeExists { account_id: i64 },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PeopleServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            Self::DepartmentNotFound => "DEPARTMENT_NOT_FOUND",
            Self::AttendanceNotFound => "ATTENDANCE_NOT_FOUND",
            Self::LeaveNotFound => "LEAVE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::DepartmentInUse => "DEPARTMENT_IN_USE",
            Self::ActiveEmployeeExists { .. } => "ACTIVE_EMPLOYEE_EXISTS",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for PeopleServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::AccountNotFound
            | Self::EmployeeNotFound
            | Self::DepartmentNotFound
            | Self::AttendanceNotFound
            | Self::LeaveNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DepartmentInUse => StatusCode::CONFLICT,
            Self::ActiveEmployeeExists { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::ActiveEmployeeExists { account_id } => {
                tracing::error!(
                    account_id,
                    kind = "ACTIVE_EMPLOYEE_EXISTS",
                    "active employee already linked to account"
                );
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(errors) = &self {
            body["errors"] = serde_json::json!(errors);
        }
        (status, axum::Json(body)).into_response()
    }
}

// ── FieldErrors ──────────────────────────────────────────────────────────────

/// Per-field validation messages, rendered as `{"field": ["message", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a `Validation` error.
    pub fn into_result(self) -> Result<(), PeopleServiceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PeopleServiceError::Validation(self))
        }
    }

    /// Take `value`, recording `field` as required when it is absent.
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, "is required");
        }
        value
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}
