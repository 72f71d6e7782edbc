//! Shared harness for the router-level integration tests.
//!
//! Each test builds its own [`TestApp`]; stores are in memory, so apps never
//! see each other's data.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use itagent_api::{
    create_api_router, generate_jwt_token, ApiConfig, AppState, AuthConfig, FixedClock,
};
use serde_json::Value;
use tower::ServiceExt;

/// Pinned "now" for token issue and validation.
pub const TEST_EPOCH_SECS: i64 = 1_700_000_000;

pub struct TestApp {
    router: Router,
    auth: AuthConfig,
}

/// Status, headers and raw body of one response.
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        clock: Arc::new(FixedClock(TEST_EPOCH_SECS)),
        ..AuthConfig::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ApiConfig::default())
    }

    pub fn with_config(config: ApiConfig) -> Self {
        let auth = test_auth_config();
        let state = AppState::new(config).expect("app state");
        let router = create_api_router(state, auth.clone()).expect("router");
        Self { router, auth }
    }

    /// A bearer token for `user_id`, valid at [`TEST_EPOCH_SECS`].
    pub fn token(&self, user_id: &str) -> String {
        generate_jwt_token(&self.auth, user_id.to_string(), Vec::new()).expect("token")
    }

    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> RawResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        RawResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Send a request and parse the JSON envelope.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let raw = self.raw(method, uri, body, token).await;
        let json = if raw.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&raw.body).expect("JSON body")
        };
        (raw.status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body), None).await
    }

    /// Create a session and return its id.
    pub async fn create_session(&self, name: &str) -> String {
        let (status, body) = self
            .post("/api/v1/sessions", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().expect("session id").to_string()
    }

    /// Post a text message and return its id.
    pub async fn add_message(
        &self,
        session_id: &str,
        sender_id: &str,
        receiver_id: Option<&str>,
        content: &str,
    ) -> String {
        let (status, body) = self
            .post(
                &format!("/api/v1/sessions/{}/messages", session_id),
                serde_json::json!({
                    "senderId": sender_id,
                    "receiverId": receiver_id,
                    "content": content,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().expect("message id").to_string()
    }
}

/// Assert a failure envelope with `status` and a message containing `needle`.
pub fn assert_failure(status: StatusCode, body: &Value, expected: StatusCode, needle: &str) {
    assert_eq!(status, expected, "{}", body);
    assert_eq!(body["success"], Value::Bool(false), "{}", body);
    let message = body["error"].as_str().unwrap_or_default();
    assert!(
        message.contains(needle),
        "error {:?} does not contain {:?}",
        message,
        needle
    );
}
