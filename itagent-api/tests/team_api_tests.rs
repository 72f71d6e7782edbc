//! Team ownership and start flow through the full router.

mod support;

use axum::http::{Method, StatusCode};
use itagent_test_utils::assertions::assert_members_ordered;
use itagent_test_utils::Team;
use serde_json::{json, Value};
use support::{assert_failure, TestApp};

async fn create_team(app: &TestApp, token: &str, team_type: &str) -> String {
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/agents/teams",
            Some(json!({ "name": "crew", "type": team_type })),
            Some(token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_str().unwrap_or_default().to_string()
}

async fn add_member(app: &TestApp, token: &str, team_id: &str, body: Value) -> (StatusCode, Value) {
    app.send(
        Method::POST,
        &format!("/api/v1/agents/teams/{}/members", team_id),
        Some(body),
        Some(token),
    )
    .await
}

#[tokio::test]
async fn test_teams_require_authentication() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/agents/teams").await;
    assert_failure(status, &body, StatusCode::UNAUTHORIZED, "Authentication required");

    // Authentication is checked before the body.
    let (status, _) = app.post("/api/v1/agents/teams", json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::GET,
            "/api/v1/agents/teams",
            None,
            Some("eyJhbGciOiJIUzI1NiJ9.e30.invalid"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", body);
}

#[tokio::test]
async fn test_non_owner_is_forbidden() {
    let app = TestApp::new();
    let alice = app.token("alice");
    let bob = app.token("bob");
    let team_id = create_team(&app, &alice, "workflow").await;

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/agents/teams/{}", team_id),
            None,
            Some(&bob),
        )
        .await;
    assert_failure(status, &body, StatusCode::FORBIDDEN, "team owner");

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/agents/teams/{}", team_id),
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .send(Method::GET, "/api/v1/agents/teams", None, Some(&bob))
        .await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_team_validates_type() {
    let app = TestApp::new();
    let token = app.token("alice");
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/agents/teams",
            Some(json!({ "name": "crew", "type": "mob" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn test_members_stay_ordered_by_position() {
    let app = TestApp::new();
    let token = app.token("alice");
    let team_id = create_team(&app, &token, "workflow").await;

    add_member(&app, &token, &team_id, json!({ "configId": "writer", "role": "member", "position": 6 })).await;
    add_member(&app, &token, &team_id, json!({ "configId": "planner", "role": "member", "position": 5 })).await;
    let (status, body) = add_member(
        &app,
        &token,
        &team_id,
        json!({ "configId": "lead", "role": "leader", "position": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let team: Team = serde_json::from_value(body["data"]["team"].clone()).expect("team");
    assert_members_ordered(&team);
    let configs: Vec<&str> = team.members.iter().map(|m| m.config_id.as_str()).collect();
    assert_eq!(configs, vec!["lead", "planner", "writer"]);

    let (status, body) = add_member(&app, &token, &team_id, json!({ "role": "leader" })).await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "configId");
}

#[tokio::test]
async fn test_start_requires_minimum_members() {
    let app = TestApp::new();
    let token = app.token("alice");
    let team_id = create_team(&app, &token, "conversation").await;
    add_member(&app, &token, &team_id, json!({ "configId": "a", "role": "leader" })).await;

    let start_uri = format!("/api/v1/agents/teams/{}/start", team_id);
    let (status, body) = app
        .send(Method::POST, &start_uri, None, Some(&token))
        .await;
    assert_failure(status, &body, StatusCode::BAD_REQUEST, "at least 2");

    add_member(&app, &token, &team_id, json!({ "configId": "b", "role": "member" })).await;
    let (status, body) = app
        .send(
            Method::POST,
            &start_uri,
            Some(json!({ "initialMessage": "kick off" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let session_id = body["data"]["sessionId"].as_str().unwrap_or_default().to_string();

    let (_, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/sessions/{}", session_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(body["data"]["status"], json!("active"));
    assert_eq!(body["data"]["teamId"], json!(team_id));
    assert_eq!(body["data"]["agents"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"]["messages"][0]["content"], json!("kick off"));

    let (_, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/agents/teams/{}", team_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(body["data"]["status"], json!("active"));
    assert_eq!(body["data"]["lastSessionId"], json!(session_id));
}
