use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hrm_auth_types::identity::Identity;
use hrm_domain::role::RoleName;

use crate::domain::types::Account;
use crate::error::{FieldErrors, PeopleServiceError};
use crate::handlers::{MessageResponse, field_rules, json_body};
use crate::state::AppState;
use crate::usecase::auth::{
    GetMeUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, SessionOutput,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleName>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "hrm_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl MeResponse {
    fn new(account: Account, roles: Vec<RoleName>) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            roles,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: MeResponse,
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: u64,
}

impl From<SessionOutput> for SessionResponse {
    fn from(session: SessionOutput) -> Self {
        Self {
            user: MeResponse::new(session.account, session.roles),
            token: session.access_token,
            token_type: "Bearer",
            expires_at: session.access_token_exp,
        }
    }
}

// ── Request bodies ───────────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn into_input(self) -> Result<RegisterInput, PeopleServiceError> {
        let mut errors = field_rules(&self);
        let name = errors.required("name", self.name);
        let email = errors.required("email", self.email);
        let password = errors.required("password", self.password);
        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(PeopleServiceError::Validation(errors));
        };
        errors.into_result()?;
        Ok(RegisterInput {
            name,
            email,
            password,
        })
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_input(self) -> Result<LoginInput, PeopleServiceError> {
        let mut errors = FieldErrors::new();
        let email = errors.required("email", self.email);
        let password = errors.required("password", self.password);
        let (Some(email), Some(password)) = (email, password) else {
            return Err(PeopleServiceError::Validation(errors));
        };
        Ok(LoginInput { email, password })
    }
}

// ── POST /api/register ───────────────────────────────────────────────────────

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), PeopleServiceError> {
    let input = json_body(payload)?.into_input()?;
    let uc = RegisterUseCase {
        scope: state.transaction_scope(),
        tokens: state.token_settings(),
    };
    let session = uc.execute(input).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

// ── POST /api/login ──────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, PeopleServiceError> {
    let input = json_body(payload)?.into_input()?;
    let uc = LoginUseCase {
        accounts: state.account_store(),
        tokens: state.token_settings(),
    };
    Ok(Json(uc.execute(input).await?.into()))
}

// ── GET /api/me ──────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, PeopleServiceError> {
    let uc = GetMeUseCase {
        accounts: state.account_store(),
    };
    let (account, roles) = uc.execute(identity.account_id).await?;
    Ok(Json(MeResponse::new(account, roles)))
}

// ── POST /api/logout ─────────────────────────────────────────────────────────

/// Access tokens are stateless; the client discards its copy.
pub async fn logout(identity: Identity) -> Json<MessageResponse> {
    tracing::info!(account_id = identity.account_id, "logged out");
    Json(MessageResponse::LOGGED_OUT)
}
