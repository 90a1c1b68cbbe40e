pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod department;
pub mod employee;
pub mod leave;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use tracing::warn;
use validator::Validate;

use hrm_core::health::{ProbeResponse, probe};
use hrm_domain::pagination::PageRequest;

use crate::error::{FieldErrors, PeopleServiceError};
use crate::state::AppState;

/// `GET /readyz`: ready once the database answers a ping.
pub async fn readyz(State(state): State<AppState>) -> ProbeResponse {
    match state.db.ping().await {
        Ok(()) => probe(true),
        Err(e) => {
            warn!(error = %e, "database ping failed");
            probe(false)
        }
    }
}

/// Body of `DELETE` and logout responses.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const DELETED: Self = Self { message: "Deleted" };
    pub const LOGGED_OUT: Self = Self {
        message: "Logged out",
    };
}

/// Unwrap a JSON body, turning a malformed payload into a 422 on `body`.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, PeopleServiceError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let mut errors = FieldErrors::new();
        errors.add("body", rejection.body_text());
        PeopleServiceError::Validation(errors)
    })
}

/// Field rule violations of `request`, as a starting error map.
pub(crate) fn field_rules(request: &impl Validate) -> FieldErrors {
    match request.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

/// `?page=&per_page=` of a list endpoint.
pub(crate) fn page_query(raw_query: Option<String>) -> Result<PageRequest, PeopleServiceError> {
    let page: PageRequest = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.add("query", e.to_string());
            PeopleServiceError::Validation(errors)
        })?
        .unwrap_or_default();
    Ok(page.clamped())
}
