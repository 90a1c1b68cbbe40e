use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::repository::DashboardQueryPort;
use crate::domain::types::{DashboardCounts, DepartmentHeadcount, RecentAttendance, RecentLeave};
use crate::error::PeopleServiceError;

/// Rows taken from each source, and the length of the merged feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

const UNKNOWN_EMPLOYEE: &str = "Unknown";

/// One line of the dashboard activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    /// `att-<id>` or `leave-<id>`.
    pub id: String,
    pub name: String,
    pub action: String,
    /// Wall-clock time as `hh:mm AM`.
    pub time: String,
    pub status: String,
    pub at: DateTime<Utc>,
}

impl From<RecentAttendance> for ActivityItem {
    fn from(row: RecentAttendance) -> Self {
        let action = if row.checked_out {
            "Checked Out"
        } else {
            "Checked In"
        };
        Self {
            id: format!("att-{}", row.id),
            name: row
                .employee_name
                .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_owned()),
            action: action.to_owned(),
            time: clock_time(row.updated_at),
            status: "success".to_owned(),
            at: row.updated_at,
        }
    }
}

impl From<RecentLeave> for ActivityItem {
    fn from(row: RecentLeave) -> Self {
        Self {
            id: format!("leave-{}", row.id),
            name: row
                .employee_name
                .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_owned()),
            action: "Applied for Leave".to_owned(),
            time: clock_time(row.created_at),
            status: row.status.to_string(),
            at: row.created_at,
        }
    }
}

fn clock_time(at: DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

/// Merge both feeds newest first and keep the first `limit` items.
pub fn merge_recent_activity(
    attendances: Vec<RecentAttendance>,
    leaves: Vec<RecentLeave>,
    limit: usize,
) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = attendances
        .into_iter()
        .map(ActivityItem::from)
        .chain(leaves.into_iter().map(ActivityItem::from))
        .collect();
    // stable: attendance wins a timestamp tie
    items.sort_by(|a, b| b.at.cmp(&a.at));
    items.truncate(limit);
    items
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub counts: DashboardCounts,
    pub recent_activity: Vec<ActivityItem>,
    pub departments: Vec<DepartmentHeadcount>,
}

pub struct GetDashboardStatsUseCase<Q: DashboardQueryPort> {
    pub repo: Q,
}

impl<Q: DashboardQueryPort> GetDashboardStatsUseCase<Q> {
    pub async fn execute(&self, today: NaiveDate) -> Result<DashboardStats, PeopleServiceError> {
        let counts = self.repo.counts(today).await?;
        let attendances = self
            .repo
            .recent_attendances(RECENT_ACTIVITY_LIMIT as u64)
            .await?;
        let leaves = self.repo.recent_leaves(RECENT_ACTIVITY_LIMIT as u64).await?;
        let departments = self.repo.department_headcounts().await?;
        Ok(DashboardStats {
            counts,
            recent_activity: merge_recent_activity(attendances, leaves, RECENT_ACTIVITY_LIMIT),
            departments,
        })
    }
}
