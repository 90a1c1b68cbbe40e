use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Employees::Table)
                    .col(Employees::DepartmentId)
                    .name("idx_employees_department_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Attendances::Table)
                    .col(Attendances::EmployeeId)
                    .col(Attendances::Date)
                    .name("idx_attendances_employee_id_date")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Leaves::Table)
                    .col(Leaves::EmployeeId)
                    .name("idx_leaves_employee_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_leaves_employee_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_attendances_employee_id_date")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_employees_department_id").to_owned())
            .await
    }
}

#[derive(Iden)]
enum Employees {
    Table,
    DepartmentId,
}

#[derive(Iden)]
enum Attendances {
    Table,
    EmployeeId,
    Date,
}

#[derive(Iden)]
enum Leaves {
    Table,
    EmployeeId,
}
