use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};

use hrm_auth_types::identity::JwtSecret;
use hrm_domain::role::RoleName;
use hrm_people::router::build_router;
use hrm_people::state::AppState;
use hrm_people_migration::Migrator;
use hrm_testing::auth::{MockAuth, TEST_JWT_SECRET};

async fn test_server() -> TestServer {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(TEST_JWT_SECRET),
        token_ttl_secs: 3600,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn admin_token() -> String {
    MockAuth::admin(1).token()
}

async fn create_department(server: &TestServer, name: &str) -> i64 {
    let response = server
        .post("/api/departments")
        .authorization_bearer(admin_token())
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

fn new_employee(email: &str, department_id: i64) -> Value {
    json!({
        "name": "A",
        "email": email,
        "department_id": department_id,
        "position": "P",
        "salary": 1,
        "hire_date": "2024-01-01",
        "status": "active",
    })
}

async fn create_employee(server: &TestServer, body: &Value) -> Value {
    let response = server
        .post("/api/employees")
        .authorization_bearer(admin_token())
        .json(body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

// ── Health / middleware ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_probes_with_request_id() {
    let server = test_server().await;

    let response = server.get("/healthz").await;
    response.assert_status(StatusCode::OK);
    assert!(!response.header("x-request-id").is_empty());

    let echoed = server
        .get("/healthz")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-42"),
        )
        .await;
    assert_eq!(echoed.header("x-request-id"), "req-42");

    let ready = server.get("/readyz").await;
    ready.assert_status(StatusCode::OK);
    ready.assert_json(&json!({"status": "ok"}));
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_login_and_read_me() {
    let server = test_server().await;

    let registered = server
        .post("/api/register")
        .json(&json!({ "name": "Ada", "email": "ada@x.com", "password": "secret1" }))
        .await;
    registered.assert_status(StatusCode::CREATED);
    let body: Value = registered.json();
    assert_eq!(body["user"]["email"], "ada@x.com");
    assert_eq!(body["user"]["roles"], json!(["employee"]));

    let login = server
        .post("/api/login")
        .json(&json!({ "email": "ada@x.com", "password": "secret1" }))
        .await;
    login.assert_status(StatusCode::OK);
    let token = login.json::<Value>()["token"].as_str().unwrap().to_owned();

    let me = server.get("/api/me").authorization_bearer(&token).await;
    me.assert_status(StatusCode::OK);
    assert_eq!(me.json::<Value>()["name"], "Ada");

    let logout = server.post("/api/logout").authorization_bearer(&token).await;
    logout.assert_status(StatusCode::OK);
    assert_eq!(logout.json::<Value>(), json!({ "message": "Logged out" }));
}

#[tokio::test]
async fn should_reject_bad_credentials_and_short_passwords() {
    let server = test_server().await;

    let short = server
        .post("/api/register")
        .json(&json!({ "name": "Ada", "email": "ada@x.com", "password": "123" }))
        .await;
    short.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(short.json::<Value>()["errors"]["password"].is_array());

    let login = server
        .post("/api/login")
        .json(&json!({ "email": "nobody@x.com", "password": "secret1" }))
        .await;
    login.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(login.json::<Value>()["kind"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn should_require_bearer_token_and_permission() {
    let server = test_server().await;

    let anonymous = server.get("/api/employees").await;
    anonymous.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json::<Value>()["kind"], "UNAUTHENTICATED");

    let plain = MockAuth::new(2, &[RoleName::Employee]);
    server
        .get("/api/employees")
        .authorization_bearer(plain.token())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let hr = MockAuth::new(3, &[RoleName::HrManager]);
    server
        .get("/api/employees")
        .authorization_bearer(hr.token())
        .await
        .assert_status(StatusCode::OK);
    server
        .delete("/api/departments/1")
        .authorization_bearer(hr.token())
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

// ── Employees ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_list_and_show_employee_with_relations() {
    let server = test_server().await;
    let department_id = create_department(&server, "Engineering").await;

    let created = create_employee(&server, &new_employee("a@x.com", department_id)).await;
    assert_eq!(created["user"]["email"], "a@x.com");
    assert_eq!(created["department"]["name"], "Engineering");
    assert_eq!(created["status"], "active");
    assert_eq!(created["hire_date"], "2024-01-01");

    let listed: Value = server
        .get("/api/employees?page=1&per_page=10")
        .authorization_bearer(admin_token())
        .await
        .json();
    assert_eq!(listed["meta"]["total"], 1);
    assert_eq!(listed["meta"]["per_page"], 10);
    assert_eq!(listed["data"][0]["id"], created["id"]);

    let shown = server
        .get(&format!("/api/employees/{}", created["id"]))
        .authorization_bearer(admin_token())
        .await;
    shown.assert_status(StatusCode::OK);
    assert_eq!(shown.json::<Value>()["user"]["name"], "A");
}

#[tokio::test]
async fn should_report_field_errors_for_incomplete_employee() {
    let server = test_server().await;

    let response = server
        .post("/api/employees")
        .authorization_bearer(admin_token())
        .json(&json!({ "position": "P", "salary": -5 }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_FAILED");
    for field in ["name", "email", "department_id", "hire_date", "status", "salary"] {
        assert!(body["errors"][field].is_array(), "missing error for {field}");
    }
}

#[tokio::test]
async fn should_report_unknown_department_after_field_rules_pass() {
    let server = test_server().await;

    let response = server
        .post("/api/employees")
        .authorization_bearer(admin_token())
        .json(&new_employee("a@x.com", 404))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["errors"]["department_id"],
        json!(["does not exist"])
    );
}

#[tokio::test]
async fn should_soft_delete_then_revive_same_employee() {
    let server = test_server().await;
    let department_id = create_department(&server, "Engineering").await;
    let first = create_employee(&server, &new_employee("a@x.com", department_id)).await;
    let id = first["id"].as_i64().unwrap();

    let deleted = server
        .delete(&format!("/api/employees/{id}"))
        .authorization_bearer(admin_token())
        .await;
    deleted.assert_status(StatusCode::OK);
    assert_eq!(deleted.json::<Value>(), json!({ "message": "Deleted" }));

    let missing = server
        .get(&format!("/api/employees/{id}"))
        .authorization_bearer(admin_token())
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["kind"], "EMPLOYEE_NOT_FOUND");

    let mut again = new_employee("a@x.com", department_id);
    again["position"] = json!("Lead");
    let revived = create_employee(&server, &again).await;
    assert_eq!(revived["id"], id);
    assert_eq!(revived["user_id"], first["user_id"]);
    assert_eq!(revived["position"], "Lead");
}

#[tokio::test]
async fn should_update_account_name_through_employee() {
    let server = test_server().await;
    let department_id = create_department(&server, "Engineering").await;
    let created = create_employee(&server, &new_employee("a@x.com", department_id)).await;

    let response = server
        .put(&format!("/api/employees/{}", created["id"]))
        .authorization_bearer(admin_token())
        .json(&json!({ "name": "X", "city": "Porto" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["name"], "X");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["city"], "Porto");
    assert_eq!(body["position"], "P");
}

// ── Departments ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_deleting_department_with_employees() {
    let server = test_server().await;
    let department_id = create_department(&server, "Engineering").await;
    let created = create_employee(&server, &new_employee("a@x.com", department_id)).await;
    server
        .delete(&format!("/api/employees/{}", created["id"]))
        .authorization_bearer(admin_token())
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .delete(&format!("/api/departments/{department_id}"))
        .authorization_bearer(admin_token())
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["kind"], "DEPARTMENT_IN_USE");
}

#[tokio::test]
async fn should_reject_duplicate_department_name() {
    let server = test_server().await;
    create_department(&server, "Engineering").await;

    let response = server
        .post("/api/departments")
        .authorization_bearer(admin_token())
        .json(&json!({ "name": "Engineering" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["errors"]["name"],
        json!(["has already been taken"])
    );
}

// ── Attendance / leave / dashboard ───────────────────────────────────────────

#[tokio::test]
async fn should_validate_leave_period_and_attendance_times() {
    let server = test_server().await;
    let department_id = create_department(&server, "Engineering").await;
    let employee = create_employee(&server, &new_employee("a@x.com", department_id)).await;

    let leave = server
        .post("/api/leaves")
        .authorization_bearer(admin_token())
        .json(&json!({
            "employee_id": employee["id"],
            "type": "annual",
            "start_date": "2024-05-03",
            "end_date": "2024-05-01",
            "reason": "trip",
        }))
        .await;
    leave.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(leave.json::<Value>()["errors"]["end_date"].is_array());

    let attendance = server
        .post("/api/attendances")
        .authorization_bearer(admin_token())
        .json(&json!({
            "employee_id": employee["id"],
            "date": "2024-05-01",
            "check_in": "2024-05-01T09:00:00Z",
            "check_out": "2024-05-01T08:00:00Z",
            "status": "present",
        }))
        .await;
    attendance.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(attendance.json::<Value>()["errors"]["check_out"].is_array());
}

#[tokio::test]
async fn should_check_updates_against_stored_values() {
    let server = test_server().await;
    let department_id = create_department(&server, "Engineering").await;
    let employee = create_employee(&server, &new_employee("a@x.com", department_id)).await;

    let leave = server
        .post("/api/leaves")
        .authorization_bearer(admin_token())
        .json(&json!({
            "employee_id": employee["id"],
            "type": "annual",
            "start_date": "2024-05-01",
            "end_date": "2024-05-03",
            "reason": "trip",
        }))
        .await;
    leave.assert_status(StatusCode::CREATED);
    let leave_id = leave.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/leaves/{leave_id}"))
        .authorization_bearer(admin_token())
        .json(&json!({ "end_date": "2024-04-30" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["errors"]["end_date"].is_array());

    let attendance = server
        .post("/api/attendances")
        .authorization_bearer(admin_token())
        .json(&json!({
            "employee_id": employee["id"],
            "date": "2024-05-01",
            "check_in": "2024-05-01T09:00:00Z",
            "status": "present",
        }))
        .await;
    attendance.assert_status(StatusCode::CREATED);
    let attendance_id = attendance.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/attendances/{attendance_id}"))
        .authorization_bearer(admin_token())
        .json(&json!({ "check_out": "2024-05-01T08:00:00Z" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["errors"]["check_out"].is_array());

    let response = server
        .put(&format!("/api/attendances/{attendance_id}"))
        .authorization_bearer(admin_token())
        .json(&json!({ "check_out": "2024-05-01T17:30:00Z" }))
        .await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["check_out"].is_string());
}

#[tokio::test]
async fn should_summarise_dashboard() {
    let server = test_server().await;
    let department_id = create_department(&server, "Engineering").await;
    let employee = create_employee(&server, &new_employee("a@x.com", department_id)).await;
    let today = Utc::now().date_naive().to_string();

    server
        .post("/api/attendances")
        .authorization_bearer(admin_token())
        .json(&json!({
            "employee_id": employee["id"],
            "date": today,
            "check_in": Utc::now(),
            "status": "present",
        }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/leaves")
        .authorization_bearer(admin_token())
        .json(&json!({
            "employee_id": employee["id"],
            "type": "sick",
            "start_date": today,
            "end_date": today,
            "reason": "flu",
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let plain = MockAuth::new(2, &[RoleName::Employee]);
    let response = server
        .get("/api/dashboard/stats")
        .authorization_bearer(plain.token())
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();

    let values: Vec<_> = body["stats"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["value"].as_u64().unwrap())
        .collect();
    assert_eq!(values, [1, 1, 1, 1]);
    assert_eq!(body["recentActivity"].as_array().unwrap().len(), 2);
    assert_eq!(body["recentActivity"][0]["name"], "A");
    assert_eq!(body["departments"], json!([{ "name": "Engineering", "count": 1 }]));
}
