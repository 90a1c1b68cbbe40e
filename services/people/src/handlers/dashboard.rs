use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use hrm_auth_types::identity::Identity;

use crate::domain::types::DashboardCounts;
use crate::error::PeopleServiceError;
use crate::state::AppState;
use crate::usecase::dashboard::{ActivityItem, DashboardStats, GetDashboardStatsUseCase};

#[derive(Serialize)]
pub struct StatCard {
    pub id: u8,
    pub title: &'static str,
    pub value: u64,
    pub trend: Option<f64>,
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub id: String,
    pub name: String,
    pub action: String,
    pub time: String,
    pub status: String,
}

impl From<ActivityItem> for ActivityResponse {
    fn from(item: ActivityItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            action: item.action,
            time: item.time,
            status: item.status,
        }
    }
}

#[derive(Serialize)]
pub struct HeadcountResponse {
    pub name: String,
    pub count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: Vec<StatCard>,
    pub recent_activity: Vec<ActivityResponse>,
    pub departments: Vec<HeadcountResponse>,
}

fn stat_cards(counts: DashboardCounts) -> Vec<StatCard> {
    [
        ("Total Employees", counts.total_employees),
        ("Active Employees", counts.active_employees),
        ("Today Attendance", counts.today_attendance),
        ("Pending Leave Requests", counts.pending_leaves),
    ]
    .into_iter()
    .zip(1u8..)
    .map(|((title, value), id)| StatCard {
        id,
        title,
        value,
        trend: None,
    })
    .collect()
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            stats: stat_cards(stats.counts),
            recent_activity: stats
                .recent_activity
                .into_iter()
                .map(ActivityResponse::from)
                .collect(),
            departments: stats
                .departments
                .into_iter()
                .map(|d| HeadcountResponse {
                    name: d.name,
                    count: d.count,
                })
                .collect(),
        }
    }
}

// ── GET /api/dashboard/stats ─────────────────────────────────────────────────

/// Open to every authenticated identity.
pub async fn get_dashboard_stats(
    _identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, PeopleServiceError> {
    let uc = GetDashboardStatsUseCase {
        repo: state.dashboard_query(),
    };
    let stats = uc.execute(Utc::now().date_naive()).await?;
    Ok(Json(stats.into()))
}
