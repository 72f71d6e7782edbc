//! Request authentication for the `/api/v1` subtree.
//!
//! A request carrying `Authorization: Bearer <JWT>` must verify or it is
//! rejected with 401. A verified token puts an [`AuthContext`] in the
//! request extensions.
//!
//! Requests without the header pass through unauthenticated. Handlers that
//! need a caller take [`AuthExtractor`]; handlers that can fall back to a
//! default user take [`OptionalAuth`].

use crate::auth::{authenticate_bearer, AuthConfig, AuthContext};
use crate::error::ApiError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: AuthConfig) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
        }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Authenticate the bearer token if the request carries one.
///
/// # Example
///
/// ```ignore
/// let auth_state = AuthMiddlewareState::new(AuthConfig::from_env());
/// let app = Router::new()
///     .route("/api/v1/agents/teams", get(list_teams))
///     .layer(middleware::from_fn_with_state(auth_state, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| ApiError::invalid_token("Authorization header is not valid UTF-8"))
        })
        .transpose()
        .map_err(AuthMiddlewareError)?;

    if let Some(header) = header {
        let auth_context =
            authenticate_bearer(&state.auth_config, &header).map_err(AuthMiddlewareError)?;
        tracing::debug!(user_id = %auth_context.user_id, "request authenticated");
        request.extensions_mut().insert(auth_context);
    }

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error wrapper for middleware and extractor rejections.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

// ============================================================================
// TYPED EXTRACTORS
// ============================================================================

/// Required caller. Rejects with 401 when the request is unauthenticated.
///
/// ```ignore
/// async fn handler(AuthExtractor(auth): AuthExtractor) -> String {
///     auth.user_id
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| {
                AuthMiddlewareError(ApiError::unauthorized(
                    "Authentication required: provide an Authorization: Bearer token",
                ))
            })
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Caller if the request was authenticated, `None` otherwise. Never rejects.
#[derive(Debug, Clone, Default)]
pub struct OptionalAuth(pub Option<AuthContext>);

impl OptionalAuth {
    /// Caller's user id, or `fallback` when unauthenticated.
    pub fn user_id_or(&self, fallback: &str) -> String {
        self.0
            .as_ref()
            .map(|ctx| ctx.user_id.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthContext>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt_token, FixedClock, JwtSecret};
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn test_auth_config() -> Result<AuthConfig, String> {
        Ok(AuthConfig {
            jwt_secret: JwtSecret::new("middleware_test_secret".to_string())
                .map_err(|e| e.to_string())?,
            clock: Arc::new(FixedClock(1_704_067_200)),
            ..Default::default()
        })
    }

    fn app(config: AuthConfig) -> Router {
        async fn required(AuthExtractor(auth): AuthExtractor) -> String {
            format!("User: {}", auth.user_id)
        }
        async fn optional(auth: OptionalAuth) -> String {
            auth.user_id_or("anonymous")
        }

        Router::new()
            .route("/required", get(required))
            .route("/optional", get(optional))
            .layer(middleware::from_fn_with_state(
                AuthMiddlewareState::new(config),
                auth_middleware,
            ))
    }

    async fn body_string(response: Response) -> Result<String, String> {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| format!("Failed to read body: {:?}", e))?;
        String::from_utf8(body.to_vec()).map_err(|e| format!("Invalid UTF-8 body: {}", e))
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() -> Result<(), String> {
        let config = test_auth_config()?;
        let token = generate_jwt_token(&config, "owner-1".to_string(), vec![])
            .map_err(|e| e.to_string())?;

        let request = axum::http::Request::builder()
            .uri("/required")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app(config)
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await?, "User: owner-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_token_on_required_route_is_401() -> Result<(), String> {
        let request = axum::http::Request::builder()
            .uri("/required")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app(test_auth_config()?)
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await?;
        assert!(body.contains("\"success\":false"));
        assert!(body.contains("UNAUTHORIZED"));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_token_is_401_even_on_optional_route() -> Result<(), String> {
        let request = axum::http::Request::builder()
            .uri("/optional")
            .header("authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app(test_auth_config()?)
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_optional_route_falls_back() -> Result<(), String> {
        let request = axum::http::Request::builder()
            .uri("/optional")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app(test_auth_config()?)
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await?, "anonymous");
        Ok(())
    }
}
