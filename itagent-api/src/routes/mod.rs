//! REST API Routes
//!
//! One module per resource, each exposing `create_router()`. This module
//! nests them under `/api/v1`, applies authentication to that subtree and
//! adds the health, OpenAPI and CORS layers around it.
//!
//! ```text
//! /api/v1/sessions            sessions, participants, messages, session tasks
//! /api/v1/tasks               tasks
//! /api/v1/tools               tool catalog, call, execute
//! /api/v1/tool-logs           invocation history
//! /api/v1/agents/teams        teams (authenticated)
//! /api/v1/agents/templates    agent templates, gallery views, export
//! /api/v1/agents/config       agent configurations
//! /api/v1/agents/capabilities capability catalog
//! /api/v1/agents/:id/interactions
//! /health                     liveness and readiness
//! ```

pub mod agent_config;
pub mod capability;
pub mod health;
pub mod interaction;
pub mod session;
pub mod task;
pub mod team;
pub mod template;
pub mod tool;
pub mod tool_log;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    BoxError, Router,
};
use std::time::Duration;
use tower::{limit::GlobalConcurrencyLimitLayer, timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth::AuthConfig,
    config::ApiConfig,
    error::{ApiError, ApiResult, ErrorCode},
    middleware::{auth_middleware, AuthMiddlewareState},
    state::AppState,
    telemetry::observability_middleware,
};

#[cfg(feature = "openapi")]
use crate::openapi::ApiDoc;
#[cfg(feature = "openapi")]
use utoipa::OpenApi;

/// Handler for /openapi.json when Swagger UI is not serving it.
#[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
async fn openapi_json() -> impl axum::response::IntoResponse {
    axum::Json(ApiDoc::openapi())
}

/// Routes under `/api/v1/agents`.
fn agent_routes() -> Router<AppState> {
    Router::new()
        .nest("/teams", team::create_router())
        .nest("/templates", template::create_router())
        .nest("/capabilities", capability::create_router())
        .nest("/config", agent_config::create_router())
        .merge(interaction::create_router())
}

/// Routes under `/api/v1`, before state and auth are applied.
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sessions", session::create_router())
        .nest("/tasks", task::create_router())
        .nest("/tools", tool::create_router())
        .nest("/tool-logs", tool_log::create_router())
        .nest("/agents", agent_routes())
}

/// Turn a timeout from the request-limit stack into the error envelope.
async fn handle_limit_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::from_code(ErrorCode::RequestTimeout)
    } else {
        ApiError::internal_error(format!("Request could not be served: {}", err))
    }
}

/// Bound every request by the configured timeout and concurrency cap.
///
/// The cap is one semaphore shared by every route.
fn with_request_limits<S>(router: Router<S>, config: &ApiConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_limit_error))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests)),
    )
}

/// Build the complete application router.
///
/// Fails in production when the JWT secret is insecure.
pub fn create_api_router(state: AppState, auth_config: AuthConfig) -> ApiResult<Router> {
    if auth_config.is_production() {
        auth_config.validate_for_production()?;
    }

    let cors = build_cors_layer(&state.config);
    let auth_state = AuthMiddlewareState::new(auth_config);

    let api = api_routes().layer(from_fn_with_state(auth_state, auth_middleware));

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/v1", api)
        .nest("/health", health::create_router());

    #[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
    {
        router = router.route("/openapi.json", axum::routing::get(openapi_json));
    }

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()));
    }

    let limits = state.config.clone();
    Ok(with_request_limits(router.with_state(state), &limits)
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// Build CORS layer from configuration.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION, HeaderName::from_static("x-request-id")])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Result<Router, String> {
        let state = AppState::new(ApiConfig::default()).map_err(|e| e.to_string())?;
        create_api_router(state, AuthConfig::default()).map_err(|e| e.to_string())
    }

    #[tokio::test]
    async fn test_health_ping_is_public() -> Result<(), String> {
        let response = test_router()?
            .oneshot(
                Request::builder()
                    .uri("/health/ping")
                    .body(Body::empty())
                    .map_err(|e| e.to_string())?,
            )
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() -> Result<(), String> {
        let response = test_router()?
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nowhere")
                    .body(Body::empty())
                    .map_err(|e| e.to_string())?,
            )
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_bearer_is_rejected() -> Result<(), String> {
        let response = test_router()?
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sessions")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .map_err(|e| e.to_string())?,
            )
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[cfg(feature = "openapi")]
    #[tokio::test]
    async fn test_openapi_json_is_served() -> Result<(), String> {
        let response = test_router()?
            .oneshot(
                Request::builder()
                    .uri("/openapi.json")
                    .body(Body::empty())
                    .map_err(|e| e.to_string())?,
            )
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_request_times_out_with_envelope() -> Result<(), String> {
        let config = ApiConfig {
            request_timeout_ms: 20,
            ..ApiConfig::default()
        };
        let router = with_request_limits(
            Router::new()
                .route(
                    "/slow",
                    axum::routing::get(|| async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        "late"
                    }),
                )
                .route("/fast", axum::routing::get(|| async { "ok" })),
            &config,
        );

        let request = |uri: &str| {
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .map_err(|e| e.to_string())
        };
        let fast = router
            .clone()
            .oneshot(request("/fast")?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(fast.status(), StatusCode::OK);

        let slow = router
            .oneshot(request("/slow")?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(slow.status(), StatusCode::REQUEST_TIMEOUT);
        let bytes = axum::body::to_bytes(slow.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        let body: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["code"], serde_json::json!("REQUEST_TIMEOUT"));
        Ok(())
    }

    #[test]
    fn test_cors_layer_accepts_configured_origins() {
        let config = ApiConfig {
            cors_origins: vec!["https://app.example.com".to_string()],
            cors_allow_credentials: true,
            ..ApiConfig::default()
        };
        let _layer = build_cors_layer(&config);
    }
}
