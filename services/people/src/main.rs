use anyhow::Context as _;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use hrm_auth_types::identity::JwtSecret;
use hrm_core::config::Config as _;
use hrm_people::config::PeopleConfig;
use hrm_people::router::build_router;
use hrm_people::state::AppState;
use hrm_people::usecase::auth::{EnsureAdminInput, EnsureAdminUseCase};
use hrm_people_migration::Migrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    hrm_core::tracing::init_tracing();

    let config = PeopleConfig::from_env().context("failed to load config from environment")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;

    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(config.jwt_secret.as_str()),
        token_ttl_secs: config.access_token_ttl_secs,
    };

    if let Some(admin) = config.bootstrap_admin() {
        let uc = EnsureAdminUseCase {
            scope: state.transaction_scope(),
        };
        uc.execute(EnsureAdminInput {
            name: admin.name,
            email: admin.email,
            password: admin.password,
        })
        .await
        .context("failed to ensure bootstrap admin")?;
    }

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.people_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .context("failed to bind")?;

    info!("people service listening on {http_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
