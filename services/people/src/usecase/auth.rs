use anyhow::Context as _;
use tracing::info;

use hrm_auth_types::token::issue_access_token;
use hrm_domain::role::RoleName;

use crate::domain::repository::{AccountStore, RoleAssignment, TransactionScope, UnitOfWork};
use crate::domain::types::{Account, NewAccount};
use crate::error::{FieldErrors, PeopleServiceError};
use crate::usecase::credential::{hash_password, verify_password};

/// Signing parameters for access tokens.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub ttl_secs: u64,
}

/// An account together with a freshly issued access token.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub account: Account,
    pub roles: Vec<RoleName>,
    pub access_token: String,
    pub access_token_exp: u64,
}

fn open_session(
    account: Account,
    roles: Vec<RoleName>,
    tokens: &TokenSettings,
) -> Result<SessionOutput, PeopleServiceError> {
    let (access_token, access_token_exp) =
        issue_access_token(account.id, &roles, &tokens.secret, tokens.ttl_secs)
            .context("issue access token")?;
    Ok(SessionOutput {
        account,
        roles,
        access_token,
        access_token_exp,
    })
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<T: TransactionScope> {
    pub scope: T,
    pub tokens: TokenSettings,
}

impl<T: TransactionScope> RegisterUseCase<T> {
    pub async fn execute(&self, input: RegisterInput) -> Result<SessionOutput, PeopleServiceError> {
        let tx = self.scope.begin().await?;
        if AccountStore::find_by_email(&tx, &input.email).await?.is_some() {
            let mut errors = FieldErrors::new();
            errors.add("email", "has already been taken");
            return Err(PeopleServiceError::Validation(errors));
        }
        let account = AccountStore::create(
            &tx,
            NewAccount {
                name: input.name,
                email: input.email,
                password_hash: hash_password(&input.password)?,
            },
        )
        .await?;
        tx.assign_default_role(account.id).await?;
        let roles = tx.roles_of(account.id).await?;
        tx.commit().await?;

        info!(account_id = account.id, "account registered");
        open_session(account, roles, &self.tokens)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<A: AccountStore + RoleAssignment> {
    pub accounts: A,
    pub tokens: TokenSettings,
}

impl<A: AccountStore + RoleAssignment> LoginUseCase<A> {
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn execute(&self, input: LoginInput) -> Result<SessionOutput, PeopleServiceError> {
        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(PeopleServiceError::InvalidCredentials)?;
        if !verify_password(&input.password, &account.password_hash) {
            return Err(PeopleServiceError::InvalidCredentials);
        }
        let roles = self.accounts.roles_of(account.id).await?;
        open_session(account, roles, &self.tokens)
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<A: AccountStore + RoleAssignment> {
    pub accounts: A,
}

impl<A: AccountStore + RoleAssignment> GetMeUseCase<A> {
    pub async fn execute(
        &self,
        account_id: i64,
    ) -> Result<(Account, Vec<RoleName>), PeopleServiceError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(PeopleServiceError::AccountNotFound)?;
        let roles = self.accounts.roles_of(account.id).await?;
        Ok((account, roles))
    }
}

// ── EnsureAdmin ──────────────────────────────────────────────────────────────

pub struct EnsureAdminInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Find or create the bootstrap account and grant it `admin`. An existing
/// account keeps its password.
pub struct EnsureAdminUseCase<T: TransactionScope> {
    pub scope: T,
}

impl<T: TransactionScope> EnsureAdminUseCase<T> {
    pub async fn execute(&self, input: EnsureAdminInput) -> Result<Account, PeopleServiceError> {
        let tx = self.scope.begin().await?;
        let account = match AccountStore::find_by_email(&tx, &input.email).await? {
            Some(account) => account,
            None => {
                AccountStore::create(
                    &tx,
                    NewAccount {
                        name: input.name,
                        email: input.email,
                        password_hash: hash_password(&input.password)?,
                    },
                )
                .await?
            }
        };
        tx.assign_role(account.id, RoleName::Admin).await?;
        tx.commit().await?;

        info!(account_id = account.id, "bootstrap admin ensured");
        Ok(account)
    }
}
