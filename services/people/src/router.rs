use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use hrm_core::health::healthz;
use hrm_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    attendance::{
        create_attendance, delete_attendance, get_attendance, list_attendances, update_attendance,
    },
    auth::{get_me, login, logout, register},
    dashboard::get_dashboard_stats,
    department::{
        create_department, delete_department, get_department, list_departments, update_department,
    },
    employee::{create_employee, delete_employee, get_employee, list_employees, update_employee},
    leave::{create_leave, delete_leave, get_leave, list_leaves, update_leave},
    readyz,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/me", get(get_me))
        .route("/api/logout", post(logout))
        // Employees
        .route("/api/employees", get(list_employees).post(create_employee))
        .route(
            "/api/employees/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        // Departments
        .route("/api/departments", get(list_departments).post(create_department))
        .route(
            "/api/departments/{id}",
            get(get_department)
                .put(update_department)
                .delete(delete_department),
        )
        // Attendance
        .route("/api/attendances", get(list_attendances).post(create_attendance))
        .route(
            "/api/attendances/{id}",
            get(get_attendance)
                .put(update_attendance)
                .delete(delete_attendance),
        )
        // Leave requests
        .route("/api/leaves", get(list_leaves).post(create_leave))
        .route(
            "/api/leaves/{id}",
            get(get_leave).put(update_leave).delete(delete_leave),
        )
        // Dashboard
        .route("/api/dashboard/stats", get(get_dashboard_stats))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
