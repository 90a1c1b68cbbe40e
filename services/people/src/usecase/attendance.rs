use chrono::{DateTime, Utc};
use tracing::info;

use hrm_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AttendanceRepository, EmployeeStore};
use crate::domain::types::{Attendance, AttendancePatch, NewAttendance};
use crate::error::{FieldErrors, PeopleServiceError};

fn check_times(
    errors: &mut FieldErrors,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
) {
    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_out < check_in {
            errors.add("check_out", "must be a time after or equal to check_in");
        }
    }
}

// ── ListAttendances / GetAttendance ──────────────────────────────────────────

pub struct ListAttendancesUseCase<R: AttendanceRepository> {
    pub repo: R,
}

impl<R: AttendanceRepository> ListAttendancesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<Attendance>, PeopleServiceError> {
        self.repo.list(page.clamped()).await
    }
}

pub struct GetAttendanceUseCase<R: AttendanceRepository> {
    pub repo: R,
}

impl<R: AttendanceRepository> GetAttendanceUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<Attendance, PeopleServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or(PeopleServiceError::AttendanceNotFound)
    }
}

// ── CreateAttendance ─────────────────────────────────────────────────────────

pub struct CreateAttendanceUseCase<R: AttendanceRepository, E: EmployeeStore> {
    pub repo: R,
    pub employees: E,
}

impl<R: AttendanceRepository, E: EmployeeStore> CreateAttendanceUseCase<R, E> {
    pub async fn execute(&self, input: NewAttendance) -> Result<Attendance, PeopleServiceError> {
        let mut errors = FieldErrors::new();
        if self.employees.find_by_id(input.employee_id).await?.is_none() {
            errors.add("employee_id", "does not exist");
        }
        check_times(&mut errors, input.check_in, input.check_out);
        errors.into_result()?;

        let attendance = self.repo.create(input).await?;
        info!(
            attendance_id = attendance.id,
            employee_id = attendance.employee_id,
            "attendance recorded"
        );
        Ok(attendance)
    }
}

// ── UpdateAttendance ─────────────────────────────────────────────────────────

pub struct UpdateAttendanceUseCase<R: AttendanceRepository> {
    pub repo: R,
}

impl<R: AttendanceRepository> UpdateAttendanceUseCase<R> {
    pub async fn execute(
        &self,
        id: i64,
        patch: AttendancePatch,
    ) -> Result<Attendance, PeopleServiceError> {
        let current = self
            .repo
            .get(id)
            .await?
            .ok_or(PeopleServiceError::AttendanceNotFound)?;

        let mut errors = FieldErrors::new();
        check_times(
            &mut errors,
            patch.check_in.unwrap_or(current.check_in),
            patch.check_out.unwrap_or(current.check_out),
        );
        errors.into_result()?;

        let attendance = self.repo.update(id, patch).await?;
        info!(attendance_id = id, "attendance updated");
        Ok(attendance)
    }
}

// ── DeleteAttendance ─────────────────────────────────────────────────────────

pub struct DeleteAttendanceUseCase<R: AttendanceRepository> {
    pub repo: R,
}

impl<R: AttendanceRepository> DeleteAttendanceUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), PeopleServiceError> {
        if !self.repo.delete(id).await? {
            return Err(PeopleServiceError::AttendanceNotFound);
        }
        info!(attendance_id = id, "attendance deleted");
        Ok(())
    }
}
