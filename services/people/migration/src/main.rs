use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(hrm_people_migration::Migrator).await;
}
