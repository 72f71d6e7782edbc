//! Axum Middleware for HTTP Request Tracing
//!
//! Wraps every request in an `http_request` span and logs its completion
//! with status and latency.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Normalize a path for span fields: UUID and numeric segments become `{id}`.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_id = Uuid::parse_str(segment).is_ok()
                || (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()));
            if is_id {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let status = response.status();
    let duration = start.elapsed();

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            route = %normalized_path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    } else {
        tracing::info!(
            method = %method,
            route = %normalized_path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/sessions/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/sessions/{id}");
    }

    #[test]
    fn test_normalize_path_mixed() {
        let path = "/api/v1/agents/teams/550e8400-e29b-41d4-a716-446655440000/members/12";
        assert_eq!(
            normalize_path(path),
            "/api/v1/agents/teams/{id}/members/{id}"
        );
    }

    #[test]
    fn test_normalize_path_keeps_slugs() {
        assert_eq!(
            normalize_path("/api/v1/tools/data-parse-json"),
            "/api/v1/tools/data-parse-json"
        );
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
