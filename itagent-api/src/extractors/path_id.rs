//! Path extractors for entity ids.
//!
//! `PathId` parses a single `/:id` segment as a UUID; `PathIds` parses two
//! (`/:id/members/:member_id`). A malformed id is a 400 envelope naming the
//! offending path, never axum's plain-text rejection.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use itagent_core::EntityId;

/// Single entity id from the path.
///
/// ```rust,ignore
/// async fn get_task(State(state): State<Arc<TaskState>>, PathId(id): PathId) -> ApiResult<...>
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub EntityId);

/// Two entity ids from the path, in route order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathIds(pub EntityId, pub EntityId);

fn rejection(parts: &Parts, err: impl std::fmt::Display) -> ApiError {
    ApiError::invalid_format("id", "a UUID").with_details(serde_json::json!({
        "path": parts.uri.path(),
        "reason": err.to_string(),
    }))
}

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<EntityId> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| rejection(parts, e))?;
        Ok(PathId(id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PathIds
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)): Path<(EntityId, EntityId)> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|e| rejection(parts, e))?;
        Ok(PathIds(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    async fn handler(PathId(id): PathId) -> String {
        id.to_string()
    }

    #[tokio::test]
    async fn test_valid_uuid_is_extracted() -> Result<(), String> {
        let id = itagent_core::new_entity_id();
        let app = Router::new().route("/tasks/:id", get(handler));
        let request = Request::builder()
            .uri(format!("/tasks/{}", id))
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app.oneshot(request).await.map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_uuid_is_400_envelope() -> Result<(), String> {
        let app = Router::new().route("/tasks/:id", get(handler));
        let request = Request::builder()
            .uri("/tasks/not-a-uuid")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app.oneshot(request).await.map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        let json: serde_json::Value = serde_json::from_slice(&body).map_err(|e| e.to_string())?;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_FORMAT");
        assert_eq!(json["details"]["path"], "/tasks/not-a-uuid");
        Ok(())
    }
}
