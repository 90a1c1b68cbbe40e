//! Bearer-token identity extractor and per-operation authorization.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;

use hrm_domain::role::{Permission, RoleName, any_grants};

use crate::token::{AuthError, validate_access_token};

/// HMAC secret used to validate access tokens. Exposed to the extractor via `FromRef`.
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authenticated caller, taken from `Authorization: Bearer <jwt>`.
///
/// Returns 401 if the header is absent or the token fails validation.
/// Permission enforcement (403) is done by handlers via [`Identity::require`].
#[derive(Debug, Clone)]
pub struct Identity {
    pub account_id: i64,
    pub roles: Vec<RoleName>,
}

impl Identity {
    pub fn can(&self, permission: Permission) -> bool {
        any_grants(&self.roles, permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), Forbidden> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::debug!(account_id = self.account_id, %permission, "permission denied");
            Err(Forbidden(permission))
        }
    }
}

/// The caller lacks the named permission.
#[derive(Debug, thiserror::Error)]
#[error("missing permission `{0}`")]
pub struct Forbidden(pub Permission);

/// Why a request could not be authenticated.
#[derive(Debug, thiserror::Error)]
pub enum IdentityRejection {
    #[error("missing bearer token")]
    Missing,
    #[error(transparent)]
    Invalid(#[from] AuthError),
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHENTICATED",
            "message": "unauthenticated",
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = IdentityRejection;

    // Extract synchronously and return a 'static future; an `async fn` here trips
    // E0195 against axum-core's `impl Future + Send` signature.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let result = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(IdentityRejection::Missing)
            .and_then(|Authorization(bearer)| {
                validate_access_token(bearer.token(), secret.as_str()).map_err(Into::into)
            })
            .map(|info| Self {
                account_id: info.account_id,
                roles: info.roles,
            });

        async move { result }
    }
}
