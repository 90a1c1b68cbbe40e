use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_account_roles;
mod m20250101_000003_create_departments;
mod m20250101_000004_create_employees;
mod m20250101_000005_create_attendances;
mod m20250101_000006_create_leaves;
mod m20250101_000007_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_account_roles::Migration),
            Box::new(m20250101_000003_create_departments::Migration),
            Box::new(m20250101_000004_create_employees::Migration),
            Box::new(m20250101_000005_create_attendances::Migration),
            Box::new(m20250101_000006_create_leaves::Migration),
            Box::new(m20250101_000007_add_lookup_indexes::Migration),
        ]
    }
}
