//! API integration tests
//!
//! Drives the full router against an in-memory database.

use axum::body::Body;
use axum::Router;
use chrono::{Duration, Utc};
use hyper::StatusCode;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use taskdesk::AppState;

async fn setup_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    taskdesk::routes::router().with_state(AppState::new(pool))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = hyper::Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(value.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn create_payload(assignee: &str, deadline_offset_days: i64) -> Value {
    let deadline = Utc::now().date_naive() + Duration::days(deadline_offset_days);
    json!({
        "taskName": "Migrate payroll data",
        "description": "Move Q3 records to the new system",
        "priority": "High",
        "deadline": deadline.to_string(),
        "assignee": assignee,
        "assignedBy": "EMP-001",
    })
}

fn decline_payload(offset_days: i64) -> Value {
    let alternative = Utc::now().date_naive() + Duration::days(offset_days);
    json!({
        "declinedReason": "Blocked on another project",
        "alternativeDate": alternative.to_string(),
    })
}

fn current_month_query() -> String {
    Utc::now().format("%B %Y").to_string().replace(' ', "%20")
}

async fn create_request(app: &Router, assignee: &str, deadline_offset_days: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/requests",
        Some(create_payload(assignee, deadline_offset_days)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_request_returns_pending_record() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/requests",
        Some(create_payload("EMP-042", 14)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["taskName"], "Migrate payroll data");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["priority"], "High");
    assert!(body.get("acceptedOn").is_none());
}

#[tokio::test]
async fn test_create_request_rejects_bad_priority() {
    let app = setup_app().await;
    let mut payload = create_payload("EMP-042", 14);
    payload["priority"] = json!("Urgent");

    let (status, _) = send(&app, "POST", "/api/requests", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_request_rejects_empty_assignee() {
    let app = setup_app().await;
    let mut payload = create_payload("EMP-042", 14);
    payload["assignee"] = json!("");

    let (status, _) = send(&app, "POST", "/api/requests", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_accept_complete_flow_manages_collaboration() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;

    let (status, body) = send(&app, "PUT", &format!("/api/requests/{}/accept", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ongoing");
    assert!(body.get("acceptedOn").is_some());

    let (_, collabs) = send(&app, "GET", "/api/collaborations", None).await;
    assert_eq!(collabs.as_array().unwrap().len(), 1);
    assert_eq!(collabs[0]["requestId"], id);
    assert_eq!(collabs[0]["progress"], 0);

    let (status, body) = send(&app, "PUT", &format!("/api/requests/{}/complete", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (_, collabs) = send(&app, "GET", "/api/collaborations", None).await;
    assert!(collabs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_accept_unknown_id_is_404() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/requests/{}/accept", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_accept_twice_is_400() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;

    send(&app, "PUT", &format!("/api/requests/{}/accept", id), None).await;
    let (status, _) = send(&app, "PUT", &format!("/api/requests/{}/accept", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_decline_rejects_past_alternative_date() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/requests/{}/decline", id),
        Some(decline_payload(-1)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_decline_archives_and_entry_is_deletable() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/requests/{}/decline", id),
        Some(decline_payload(5)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "declined");

    let (_, entries) = send(&app, "GET", "/api/declined", None).await;
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["requestId"], id);
    assert_eq!(entries[0]["declinedReason"], "Blocked on another project");
    let entry_id = entries[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "DELETE", &format!("/api/declined/{}", entry_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, entries) = send(&app, "GET", "/api/declined", None).await;
    assert!(entries.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_pending_then_locked_after_accept() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/requests/{}", id),
        Some(json!({ "description": "Move Q3 and Q4 records" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Move Q3 and Q4 records");

    send(&app, "PUT", &format!("/api/requests/{}/accept", id), None).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/requests/{}", id),
        Some(json!({ "description": "Too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_request() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;

    let (status, body) = send(&app, "DELETE", &format!("/api/requests/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request deleted");

    let (status, _) = send(&app, "PUT", &format!("/api/requests/{}/accept", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_queries_filter_by_identity() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;

    let (_, mine) = send(&app, "GET", "/api/requests/pending/EMP-001", None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, theirs) = send(&app, "GET", "/api/requests/pending/EMP-999", None).await;
    assert!(theirs.as_array().unwrap().is_empty());

    let (_, assigned) = send(&app, "GET", "/api/requests/assigned/EMP-042", None).await;
    assert_eq!(assigned.as_array().unwrap().len(), 1);
    assert_eq!(assigned[0]["id"], id);

    send(&app, "PUT", &format!("/api/requests/{}/accept", id), None).await;

    let (_, ongoing) = send(&app, "GET", "/api/requests/ongoing", None).await;
    assert_eq!(ongoing.as_array().unwrap().len(), 1);

    let (_, by_assignee) = send(&app, "GET", "/api/requests/ongoing/EMP-042", None).await;
    assert_eq!(by_assignee.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_collaboration_progress_update() {
    let app = setup_app().await;
    let id = create_request(&app, "EMP-042", 14).await;
    send(&app, "PUT", &format!("/api/requests/{}/accept", id), None).await;

    let (_, collabs) = send(&app, "GET", "/api/collaborations", None).await;
    let collab_id = collabs[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/collaborations/{}/progress", collab_id),
        Some(json!({ "progress": 75 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, collabs) = send(&app, "GET", "/api/collaborations", None).await;
    assert_eq!(collabs[0]["progress"], 75);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/collaborations/{}/progress", collab_id),
        Some(json!({ "progress": 140 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_evaluation_crud_and_month_uniqueness() {
    let app = setup_app().await;
    let payload = json!({
        "employee": "EMP-042",
        "month": "August 2026",
        "grade": "B",
        "notes": "Reliable delivery",
        "furtherAction": "None",
    });

    let (status, body) = send(&app, "POST", "/api/evaluations", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let eval_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", "/api/evaluations", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listed) = send(&app, "GET", "/api/evaluations/August%202026", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/evaluations/{}", eval_id),
        Some(json!({ "grade": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["grade"], "A");
    assert_eq!(updated["notes"], "Reliable delivery");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/evaluations/{}", eval_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, "GET", "/api/evaluations/August%202026", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_evaluation_rejects_bad_month_label() {
    let app = setup_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/evaluations",
        Some(json!({
            "employee": "EMP-042",
            "month": "Smarch 2026",
            "grade": "B",
            "notes": "n/a",
            "furtherAction": "n/a",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_employee_stats_scenario() {
    let app = setup_app().await;
    let employee = "EMP-077";

    // Completed on time
    let on_time = create_request(&app, employee, 7).await;
    send(&app, "PUT", &format!("/api/requests/{}/accept", on_time), None).await;
    send(&app, "PUT", &format!("/api/requests/{}/complete", on_time), None).await;

    // Completed late (deadline already passed)
    let late = create_request(&app, employee, -3).await;
    send(&app, "PUT", &format!("/api/requests/{}/accept", late), None).await;
    send(&app, "PUT", &format!("/api/requests/{}/complete", late), None).await;

    // Declined
    let declined = create_request(&app, employee, 7).await;
    send(
        &app,
        "PUT",
        &format!("/api/requests/{}/decline", declined),
        Some(decline_payload(5)),
    )
    .await;

    let uri = format!("/api/stats/{}?month={}", employee, current_month_query());
    let (status, stats) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 2);
    assert_eq!(stats["declined"], 1);
    assert_eq!(stats["accepted"], 0);
    assert!((stats["completionRate"].as_f64().unwrap() - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats["onTimeRate"], 50.0);
    assert_eq!(stats["acceptanceRate"], 0.0);
}

#[tokio::test]
async fn test_stats_reject_bad_month_label() {
    let app = setup_app().await;
    let (status, _) = send(&app, "GET", "/api/stats/EMP-042?month=NotAMonth", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_organization_stats_average_across_employees() {
    let app = setup_app().await;

    // EMP-201 accepts, EMP-202 declines: acceptance rates 100 and 0
    let accepted = create_request(&app, "EMP-201", 7).await;
    send(&app, "PUT", &format!("/api/requests/{}/accept", accepted), None).await;

    let declined = create_request(&app, "EMP-202", 7).await;
    send(
        &app,
        "PUT",
        &format!("/api/requests/{}/decline", declined),
        Some(decline_payload(5)),
    )
    .await;

    let uri = format!(
        "/api/stats?month={}&employees=EMP-201,EMP-202",
        current_month_query()
    );
    let (status, stats) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(stats["employees"], 2);
    assert_eq!(stats["acceptanceRate"], 50.0);
}
