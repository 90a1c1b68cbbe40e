use std::collections::HashMap;

use anyhow::{Context as _, anyhow};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use hrm_domain::attendance::AttendanceStatus;
use hrm_domain::employee::EmployeeStatus;
use hrm_domain::leave::{LeaveStatus, LeaveType};
use hrm_domain::pagination::{Page, PageRequest};
use hrm_people_schema::{attendances, departments, employees, leaves, users};

use crate::domain::repository::{
    AttendanceRepository, DashboardQueryPort, DepartmentRepository, EmployeeDirectory,
    LeaveRepository,
};
use crate::domain::types::{
    AccountSummary, Attendance, AttendancePatch, DashboardCounts, Department,
    DepartmentHeadcount, DepartmentPatch, DepartmentSummary, DepartmentView, EmployeeView, Leave,
    LeavePatch, NewAttendance, NewDepartment, NewLeave, RecentAttendance, RecentLeave,
};
use crate::error::PeopleServiceError;
use crate::infra::db::employee_from_model;

// ── Shared lookups ───────────────────────────────────────────────────────────

async fn account_summaries<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<i64>,
) -> Result<HashMap<i64, AccountSummary>, PeopleServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(conn)
        .await
        .context("load account summaries")?;
    Ok(models
        .into_iter()
        .map(|m| {
            (
                m.id,
                AccountSummary {
                    id: m.id,
                    name: m.name,
                    email: m.email,
                },
            )
        })
        .collect())
}

/// Active employee count per department id.
async fn active_headcounts<C: ConnectionTrait>(
    conn: &C,
    department_ids: Option<Vec<i64>>,
) -> Result<HashMap<i64, u64>, PeopleServiceError> {
    let mut query = employees::Entity::find()
        .select_only()
        .column(employees::Column::DepartmentId)
        .filter(employees::Column::DeletedAt.is_null());
    if let Some(ids) = department_ids {
        query = query.filter(employees::Column::DepartmentId.is_in(ids));
    }
    let rows: Vec<i64> = query
        .into_tuple()
        .all(conn)
        .await
        .context("load department headcounts")?;
    let mut counts = HashMap::new();
    for department_id in rows {
        *counts.entry(department_id).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Account name behind each active employee id.
async fn employee_names<C: ConnectionTrait>(
    conn: &C,
    employee_ids: Vec<i64>,
) -> Result<HashMap<i64, String>, PeopleServiceError> {
    if employee_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, i64)> = employees::Entity::find()
        .select_only()
        .column(employees::Column::Id)
        .column(employees::Column::UserId)
        .filter(employees::Column::Id.is_in(employee_ids))
        .filter(employees::Column::DeletedAt.is_null())
        .into_tuple()
        .all(conn)
        .await
        .context("load employee accounts")?;
    let accounts = account_summaries(conn, rows.iter().map(|(_, a)| *a).collect()).await?;
    Ok(rows
        .into_iter()
        .filter_map(|(employee_id, account_id)| {
            accounts
                .get(&account_id)
                .map(|a| (employee_id, a.name.clone()))
        })
        .collect())
}

// ── Employee directory ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEmployeeDirectory {
    pub db: DatabaseConnection,
}

impl DbEmployeeDirectory {
    async fn attach(
        &self,
        models: Vec<employees::Model>,
    ) -> Result<Vec<EmployeeView>, PeopleServiceError> {
        let accounts =
            account_summaries(&self.db, models.iter().map(|m| m.user_id).collect()).await?;
        let department_ids: Vec<i64> = models.iter().map(|m| m.department_id).collect();
        let departments: HashMap<i64, DepartmentSummary> = departments::Entity::find()
            .filter(departments::Column::Id.is_in(department_ids))
            .all(&self.db)
            .await
            .context("load employee departments")?
            .into_iter()
            .map(|d| {
                (
                    d.id,
                    DepartmentSummary {
                        id: d.id,
                        name: d.name,
                        description: d.description,
                    },
                )
            })
            .collect();

        models
            .into_iter()
            .map(|model| {
                let account = accounts
                    .get(&model.user_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("employee {} has no account", model.id))?;
                let department = departments.get(&model.department_id).cloned();
                Ok(EmployeeView {
                    record: employee_from_model(model)?,
                    account,
                    department,
                })
            })
            .collect()
    }
}

impl EmployeeDirectory for DbEmployeeDirectory {
    async fn list(&self, page: PageRequest) -> Result<Page<EmployeeView>, PeopleServiceError> {
        let query = employees::Entity::find().filter(employees::Column::DeletedAt.is_null());
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count employees")?;
        let models = query
            .order_by_asc(employees::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list employees")?;
        Ok(Page::new(self.attach(models).await?, page, total))
    }

    async fn get(&self, id: i64) -> Result<Option<EmployeeView>, PeopleServiceError> {
        let model = employees::Entity::find_by_id(id)
            .filter(employees::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .context("get employee")?;
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(self.attach(vec![model]).await?.pop())
    }
}

// ── Department repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDepartmentRepository {
    pub db: DatabaseConnection,
}

impl DbDepartmentRepository {
    async fn attach(
        &self,
        models: Vec<departments::Model>,
    ) -> Result<Vec<DepartmentView>, PeopleServiceError> {
        let managers = account_summaries(
            &self.db,
            models.iter().filter_map(|m| m.manager_id).collect(),
        )
        .await?;
        let counts =
            active_headcounts(&self.db, Some(models.iter().map(|m| m.id).collect())).await?;
        Ok(models
            .into_iter()
            .map(|model| DepartmentView {
                manager: model.manager_id.and_then(|id| managers.get(&id).cloned()),
                employees_count: counts.get(&model.id).copied().unwrap_or(0),
                department: department_from_model(model),
            })
            .collect())
    }
}

impl DepartmentRepository for DbDepartmentRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<DepartmentView>, PeopleServiceError> {
        let total = departments::Entity::find()
            .count(&self.db)
            .await
            .context("count departments")?;
        let models = departments::Entity::find()
            .order_by_asc(departments::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list departments")?;
        Ok(Page::new(self.attach(models).await?, page, total))
    }

    async fn get(&self, id: i64) -> Result<Option<DepartmentView>, PeopleServiceError> {
        let model = departments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("get department")?;
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(self.attach(vec![model]).await?.pop())
    }

    async fn exists(&self, id: i64) -> Result<bool, PeopleServiceError> {
        let count = departments::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("check department exists")?;
        Ok(count > 0)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, PeopleServiceError> {
        let model = departments::Entity::find()
            .filter(departments::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find department by name")?;
        Ok(model.map(department_from_model))
    }

    async fn create(&self, department: NewDepartment) -> Result<Department, PeopleServiceError> {
        let now = Utc::now();
        let model = departments::ActiveModel {
            name: Set(department.name),
            description: Set(department.description),
            manager_id: Set(department.manager_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create department")?;
        Ok(department_from_model(model))
    }

    async fn update(
        &self,
        id: i64,
        patch: DepartmentPatch,
    ) -> Result<Department, PeopleServiceError> {
        let model = departments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find department for update")?
            .ok_or(PeopleServiceError::DepartmentNotFound)?;
        let mut am = model.into_active_model();
        if let Some(name) = patch.name {
            am.name = Set(name);
        }
        if let Some(description) = patch.description {
            am.description = Set(description);
        }
        if let Some(manager_id) = patch.manager_id {
            am.manager_id = Set(manager_id);
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.context("update department")?;
        Ok(department_from_model(model))
    }

    async fn count_employee_rows(&self, id: i64) -> Result<u64, PeopleServiceError> {
        let count = employees::Entity::find()
            .filter(employees::Column::DepartmentId.eq(id))
            .count(&self.db)
            .await
            .context("count department employees")?;
        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool, PeopleServiceError> {
        let result = departments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete department")?;
        Ok(result.rows_affected > 0)
    }
}

fn department_from_model(model: departments::Model) -> Department {
    Department {
        id: model.id,
        name: model.name,
        description: model.description,
        manager_id: model.manager_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Attendance repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAttendanceRepository {
    pub db: DatabaseConnection,
}

impl AttendanceRepository for DbAttendanceRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Attendance>, PeopleServiceError> {
        let total = attendances::Entity::find()
            .count(&self.db)
            .await
            .context("count attendances")?;
        let models = attendances::Entity::find()
            .order_by_desc(attendances::Column::Date)
            .order_by_desc(attendances::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list attendances")?;
        let items = models
            .into_iter()
            .map(attendance_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn get(&self, id: i64) -> Result<Option<Attendance>, PeopleServiceError> {
        let model = attendances::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("get attendance")?;
        model.map(attendance_from_model).transpose()
    }

    async fn create(&self, attendance: NewAttendance) -> Result<Attendance, PeopleServiceError> {
        let now = Utc::now();
        let model = attendances::ActiveModel {
            employee_id: Set(attendance.employee_id),
            date: Set(attendance.date),
            check_in: Set(attendance.check_in),
            check_out: Set(attendance.check_out),
            status: Set(attendance.status.as_str().to_owned()),
            notes: Set(attendance.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create attendance")?;
        attendance_from_model(model)
    }

    async fn update(
        &self,
        id: i64,
        patch: AttendancePatch,
    ) -> Result<Attendance, PeopleServiceError> {
        let model = attendances::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find attendance for update")?
            .ok_or(PeopleServiceError::AttendanceNotFound)?;
        let mut am = model.into_active_model();
        if let Some(check_in) = patch.check_in {
            am.check_in = Set(check_in);
        }
        if let Some(check_out) = patch.check_out {
            am.check_out = Set(check_out);
        }
        if let Some(status) = patch.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(notes) = patch.notes {
            am.notes = Set(notes);
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.context("update attendance")?;
        attendance_from_model(model)
    }

    async fn delete(&self, id: i64) -> Result<bool, PeopleServiceError> {
        let result = attendances::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete attendance")?;
        Ok(result.rows_affected > 0)
    }
}

fn attendance_from_model(model: attendances::Model) -> Result<Attendance, PeopleServiceError> {
    let status = model
        .status
        .parse::<AttendanceStatus>()
        .context("parse stored attendance status")?;
    Ok(Attendance {
        id: model.id,
        employee_id: model.employee_id,
        date: model.date,
        check_in: model.check_in,
        check_out: model.check_out,
        status,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Leave repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLeaveRepository {
    pub db: DatabaseConnection,
}

impl LeaveRepository for DbLeaveRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Leave>, PeopleServiceError> {
        let total = leaves::Entity::find()
            .count(&self.db)
            .await
            .context("count leaves")?;
        let models = leaves::Entity::find()
            .order_by_desc(leaves::Column::CreatedAt)
            .order_by_desc(leaves::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list leaves")?;
        let items = models
            .into_iter()
            .map(leave_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn get(&self, id: i64) -> Result<Option<Leave>, PeopleServiceError> {
        let model = leaves::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("get leave")?;
        model.map(leave_from_model).transpose()
    }

    async fn create(&self, leave: NewLeave) -> Result<Leave, PeopleServiceError> {
        let now = Utc::now();
        let model = leaves::ActiveModel {
            employee_id: Set(leave.employee_id),
            leave_type: Set(leave.leave_type.as_str().to_owned()),
            start_date: Set(leave.start_date),
            end_date: Set(leave.end_date),
            reason: Set(leave.reason),
            status: Set(leave.status.as_str().to_owned()),
            approved_by: Set(leave.approved_by),
            approval_date: Set(leave.approval_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create leave")?;
        leave_from_model(model)
    }

    async fn update(&self, id: i64, patch: LeavePatch) -> Result<Leave, PeopleServiceError> {
        let model = leaves::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find leave for update")?
            .ok_or(PeopleServiceError::LeaveNotFound)?;
        let mut am = model.into_active_model();
        if let Some(leave_type) = patch.leave_type {
            am.leave_type = Set(leave_type.as_str().to_owned());
        }
        if let Some(start_date) = patch.start_date {
            am.start_date = Set(start_date);
        }
        if let Some(end_date) = patch.end_date {
            am.end_date = Set(end_date);
        }
        if let Some(reason) = patch.reason {
            am.reason = Set(reason);
        }
        if let Some(status) = patch.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(approved_by) = patch.approved_by {
            am.approved_by = Set(approved_by);
        }
        if let Some(approval_date) = patch.approval_date {
            am.approval_date = Set(approval_date);
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.context("update leave")?;
        leave_from_model(model)
    }

    async fn delete(&self, id: i64) -> Result<bool, PeopleServiceError> {
        let result = leaves::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete leave")?;
        Ok(result.rows_affected > 0)
    }
}

fn leave_from_model(model: leaves::Model) -> Result<Leave, PeopleServiceError> {
    let leave_type = model
        .leave_type
        .parse::<LeaveType>()
        .context("parse stored leave type")?;
    let status = model
        .status
        .parse::<LeaveStatus>()
        .context("parse stored leave status")?;
    Ok(Leave {
        id: model.id,
        employee_id: model.employee_id,
        leave_type,
        start_date: model.start_date,
        end_date: model.end_date,
        reason: model.reason,
        status,
        approved_by: model.approved_by,
        approval_date: model.approval_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Dashboard queries ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDashboardQuery {
    pub db: DatabaseConnection,
}

impl DashboardQueryPort for DbDashboardQuery {
    async fn counts(&self, today: NaiveDate) -> Result<DashboardCounts, PeopleServiceError> {
        let active_rows = employees::Entity::find().filter(employees::Column::DeletedAt.is_null());
        let total_employees = active_rows
            .clone()
            .count(&self.db)
            .await
            .context("count employees")?;
        let active_employees = active_rows
            .filter(employees::Column::Status.eq(EmployeeStatus::Active.as_str()))
            .count(&self.db)
            .await
            .context("count active employees")?;
        let today_attendance = attendances::Entity::find()
            .filter(attendances::Column::Date.eq(today))
            .count(&self.db)
            .await
            .context("count today attendance")?;
        let pending_leaves = leaves::Entity::find()
            .filter(leaves::Column::Status.eq(LeaveStatus::Pending.as_str()))
            .count(&self.db)
            .await
            .context("count pending leaves")?;
        Ok(DashboardCounts {
            total_employees,
            active_employees,
            today_attendance,
            pending_leaves,
        })
    }

    async fn recent_attendances(
        &self,
        limit: u64,
    ) -> Result<Vec<RecentAttendance>, PeopleServiceError> {
        let models = attendances::Entity::find()
            .order_by_desc(attendances::Column::UpdatedAt)
            .order_by_desc(attendances::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recent attendances")?;
        let names =
            employee_names(&self.db, models.iter().map(|m| m.employee_id).collect()).await?;
        Ok(models
            .into_iter()
            .map(|m| RecentAttendance {
                id: m.id,
                employee_name: names.get(&m.employee_id).cloned(),
                checked_out: m.check_out.is_some(),
                updated_at: m.updated_at,
            })
            .collect())
    }

    async fn recent_leaves(&self, limit: u64) -> Result<Vec<RecentLeave>, PeopleServiceError> {
        let models = leaves::Entity::find()
            .order_by_desc(leaves::Column::CreatedAt)
            .order_by_desc(leaves::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recent leaves")?;
        let names =
            employee_names(&self.db, models.iter().map(|m| m.employee_id).collect()).await?;
        models
            .into_iter()
            .map(|m| {
                let status = m
                    .status
                    .parse::<LeaveStatus>()
                    .context("parse stored leave status")?;
                Ok(RecentLeave {
                    id: m.id,
                    employee_name: names.get(&m.employee_id).cloned(),
                    status,
                    created_at: m.created_at,
                })
            })
            .collect()
    }

    async fn department_headcounts(
        &self,
    ) -> Result<Vec<DepartmentHeadcount>, PeopleServiceError> {
        let models = departments::Entity::find()
            .order_by_asc(departments::Column::Id)
            .all(&self.db)
            .await
            .context("list departments")?;
        let counts = active_headcounts(&self.db, None).await?;
        Ok(models
            .into_iter()
            .map(|d| DepartmentHeadcount {
                count: counts.get(&d.id).copied().unwrap_or(0),
                name: d.name,
            })
            .collect())
    }
}
