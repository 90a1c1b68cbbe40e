//! Mock auth helpers for integration tests.
//!
//! Protected routes expect `Authorization: Bearer <jwt>`. `MockAuth` signs a real
//! token with the test secret so requests pass the `Identity` extractor without a
//! login round-trip.

use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use hrm_auth_types::token::issue_access_token;
use hrm_domain::role::RoleName;

/// Secret shared by test routers and [`MockAuth`].
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub account_id: i64,
    pub roles: Vec<RoleName>,
}

impl MockAuth {
    pub fn new(account_id: i64, roles: &[RoleName]) -> Self {
        Self {
            account_id,
            roles: roles.to_vec(),
        }
    }

    pub fn admin(account_id: i64) -> Self {
        Self::new(account_id, &[RoleName::Admin])
    }

    /// Signed bearer token for this identity.
    pub fn token(&self) -> String {
        issue_access_token(self.account_id, &self.roles, TEST_JWT_SECRET, 3600)
            .map(|(token, _)| token)
            .unwrap()
    }

    /// Return headers as a logged-in client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token())).unwrap(),
        );
        map
    }
}
