//! Agent configuration endpoints through the full router.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::{assert_failure, TestApp};

async fn create_config(app: &TestApp, name: &str, role: &str) -> (StatusCode, Value) {
    app.post(
        "/api/v1/agents/config",
        json!({
            "name": name,
            "role": role,
            "systemMessage": format!("You are {}.", name),
            "capabilities": ["search"],
        }),
    )
    .await
}

#[tokio::test]
async fn test_config_crud() {
    let app = TestApp::new();
    let (status, body) = create_config(&app, "Code Critic", "critic").await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["color"], json!("#dc2626"));
    assert_eq!(body["data"]["model"], json!("gpt-3.5-turbo"));
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/v1/agents/config/{}", id),
            Some(json!({ "model": "gpt-4", "description": "Strict" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["model"], json!("gpt-4"));
    assert_eq!(body["data"]["name"], json!("Code Critic"));

    let (status, body) = app.get(&format!("/api/v1/agents/config/{}", id)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["description"], json!("Strict"));

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/agents/config/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&format!("/api/v1/agents/config/{}", id)).await;
    assert_failure(status, &body, StatusCode::NOT_FOUND, "Agent config not found");
}

#[tokio::test]
async fn test_create_requires_system_message() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/v1/agents/config", json!({ "name": "Quiet", "role": "assistant" }))
        .await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "systemMessage");

    let (status, body) = create_config(&app, "Bard", "bard").await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "bard");
}

#[tokio::test]
async fn test_list_by_role_and_clone() {
    let app = TestApp::new();
    let (_, body) = create_config(&app, "Writer", "coder").await;
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    create_config(&app, "Checker", "tester").await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/v1/agents/config/{}/clone", id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["name"], json!("Writer (copy)"));
    assert_eq!(body["data"]["capabilities"], json!(["search"]));

    let (_, body) = app.get("/api/v1/agents/config?role=coder").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    let (_, body) = app.get("/api/v1/agents/config").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_role_template_lookup() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/agents/config/roles/planner").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["role"], json!("planner"));
    assert!(body["data"]["systemMessage"].is_string());

    let (status, _) = app.get("/api/v1/agents/config/roles/oracle").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_routes_do_not_shadow_interactions() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/agents/agent-7/interactions").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
}
