//! Task lifecycle through the full router.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::{assert_failure, TestApp};

async fn create_task(app: &TestApp, body: Value) -> Value {
    let (status, body) = app.post("/api/v1/tasks", body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

async fn set_status(app: &TestApp, id: &str, status: &str) -> (StatusCode, Value) {
    app.patch(
        &format!("/api/v1/tasks/{}/status", id),
        json!({ "status": status }),
    )
    .await
}

#[tokio::test]
async fn test_create_task_defaults() {
    let app = TestApp::new();
    let task = create_task(&app, json!({ "name": "triage" })).await;
    assert_eq!(task["status"], json!("pending"));
    assert_eq!(task["priority"], json!("medium"));
    assert_eq!(task["type"], json!("manual"));
    assert!(task.get("completedAt").is_none());
}

#[tokio::test]
async fn test_create_task_requires_name() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/v1/tasks", json!({ "priority": "high" })).await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "name");
}

#[tokio::test]
async fn test_completed_at_tracks_completed_status() {
    let app = TestApp::new();
    let task = create_task(&app, json!({ "name": "ship" })).await;
    let id = task["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = set_status(&app, &id, "running").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["data"]["startedAt"].is_string());
    assert!(body["data"].get("completedAt").is_none());

    let (_, body) = set_status(&app, &id, "completed").await;
    assert_eq!(body["data"]["status"], json!("completed"));
    assert!(body["data"]["completedAt"].is_string());
    assert!(body["data"]["endedAt"].is_string());

    // Reopening clears the completion stamp.
    let (_, body) = set_status(&app, &id, "running").await;
    assert!(body["data"].get("completedAt").is_none());
}

#[tokio::test]
async fn test_status_accepts_post() {
    let app = TestApp::new();
    let task = create_task(&app, json!({ "name": "post-status" })).await;
    let id = task["id"].as_str().unwrap_or_default();
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/v1/tasks/{}/status", id),
            Some(json!({ "status": "failed" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], json!("failed"));
}

#[tokio::test]
async fn test_unknown_status_is_rejected() {
    let app = TestApp::new();
    let task = create_task(&app, json!({ "name": "bogus" })).await;
    let id = task["id"].as_str().unwrap_or_default();

    let (status, body) = set_status(&app, id, "bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["success"], json!(false));

    let (status, body) = set_status(&app, id, "").await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "status");
}

#[tokio::test]
async fn test_assign_moves_pending_task_to_assigned() {
    let app = TestApp::new();
    let task = create_task(&app, json!({ "name": "assign me" })).await;
    let id = task["id"].as_str().unwrap_or_default();

    let (status, body) = app
        .post(
            &format!("/api/v1/tasks/{}/assign", id),
            json!({ "agentId": "agent-7" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["assignedTo"], json!("agent-7"));
    assert_eq!(body["data"]["status"], json!("assigned"));

    let (status, body) = app
        .post(&format!("/api/v1/tasks/{}/assign", id), json!({}))
        .await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "agentId");
}

#[tokio::test]
async fn test_sub_tasks_block_parent_delete() {
    let app = TestApp::new();
    let parent = create_task(&app, json!({ "name": "epic" })).await;
    let parent_id = parent["id"].as_str().unwrap_or_default().to_string();
    let child = create_task(
        &app,
        json!({ "name": "story", "parentTaskId": parent_id }),
    )
    .await;

    let (_, body) = app.get(&format!("/api/v1/tasks/{}", parent_id)).await;
    assert_eq!(body["data"]["subTasks"][0]["id"], child["id"]);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/v1/tasks/{}", parent_id), None, None)
        .await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "sub-task");

    let child_id = child["id"].as_str().unwrap_or_default();
    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/tasks/{}", child_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/tasks/{}", parent_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = TestApp::new();
    let done = create_task(&app, json!({ "name": "done" })).await;
    create_task(&app, json!({ "name": "open" })).await;
    set_status(&app, done["id"].as_str().unwrap_or_default(), "completed").await;

    let (status, body) = app.get("/api/v1/tasks?status=completed").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let names: Vec<&str> = body["data"]
        .as_array()
        .map(|tasks| tasks.iter().filter_map(|t| t["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["done"]);
}
