use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use hrm_auth_types::identity::JwtSecret;

use crate::infra::db::{DbAccountStore, DbEmployeeStore, DbTransactionScope};
use crate::infra::records::{
    DbAttendanceRepository, DbDashboardQuery, DbDepartmentRepository, DbEmployeeDirectory,
    DbLeaveRepository,
};
use crate::usecase::auth::TokenSettings;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: JwtSecret,
    pub token_ttl_secs: u64,
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn account_store(&self) -> DbAccountStore {
        DbAccountStore {
            db: self.db.clone(),
        }
    }

    pub fn employee_store(&self) -> DbEmployeeStore {
        DbEmployeeStore {
            db: self.db.clone(),
        }
    }

    pub fn transaction_scope(&self) -> DbTransactionScope {
        DbTransactionScope {
            db: self.db.clone(),
        }
    }

    pub fn employee_directory(&self) -> DbEmployeeDirectory {
        DbEmployeeDirectory {
            db: self.db.clone(),
        }
    }

    pub fn department_repo(&self) -> DbDepartmentRepository {
        DbDepartmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn attendance_repo(&self) -> DbAttendanceRepository {
        DbAttendanceRepository {
            db: self.db.clone(),
        }
    }

    pub fn leave_repo(&self) -> DbLeaveRepository {
        DbLeaveRepository {
            db: self.db.clone(),
        }
    }

    pub fn dashboard_query(&self) -> DbDashboardQuery {
        DbDashboardQuery {
            db: self.db.clone(),
        }
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            secret: self.jwt_secret.as_str().to_owned(),
            ttl_secs: self.token_ttl_secs,
        }
    }
}
