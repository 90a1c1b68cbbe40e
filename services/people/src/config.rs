use serde::Deserialize;

/// People service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct PeopleConfig {
    /// Database connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for access tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 8080). Env var: `PEOPLE_PORT`.
    #[serde(default = "default_port")]
    pub people_port: u16,
    /// Access token lifetime in seconds (default one day).
    #[serde(default = "default_token_ttl")]
    pub access_token_ttl_secs: u64,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub bootstrap_admin_name: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_token_ttl() -> u64 {
    86_400
}

impl hrm_core::config::Config for PeopleConfig {}

/// Credentials of the account promoted to `admin` at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl PeopleConfig {
    /// `Some` only when both email and password are configured.
    pub fn bootstrap_admin(&self) -> Option<BootstrapAdmin> {
        let email = self.bootstrap_admin_email.clone()?;
        let password = self.bootstrap_admin_password.clone()?;
        Some(BootstrapAdmin {
            name: self
                .bootstrap_admin_name
                .clone()
                .unwrap_or_else(|| "Administrator".to_owned()),
            email,
            password,
        })
    }
}
