//! Health endpoints mounted at `/health`, outside the authenticated subtree.
//!
//! `ping` and `live` only prove the process answers. `ready` also reads the
//! session and tool stores and reports 503 if either lock is poisoned.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};

use crate::services::{SessionService, ToolService};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Body of every health check except `ping`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stores: Option<StoreCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Entity counts read during the readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StoreCounts {
    pub sessions: usize,
    pub tools: usize,
}

impl HealthReport {
    fn up() -> Self {
        Self {
            status: HealthStatus::Up,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: None,
            stores: None,
            reason: None,
        }
    }
}

/// GET /health/ping
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses((status = 200, description = "Plain-text pong", body = String)),
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Process answers requests", body = HealthReport)),
)]
pub async fn liveness() -> Json<HealthReport> {
    Json(HealthReport::up())
}

/// GET /health/ready
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Stores readable", body = HealthReport),
        (status = 503, description = "A store could not be read", body = HealthReport),
    ),
)]
pub async fn readiness(
    State(sessions): State<Arc<SessionService>>,
    State(tools): State<Arc<ToolService>>,
    State(started): State<Instant>,
) -> impl IntoResponse {
    let mut report = HealthReport {
        uptime_secs: Some(started.elapsed().as_secs()),
        ..HealthReport::up()
    };

    let counts = sessions
        .count()
        .and_then(|sessions| Ok(StoreCounts { sessions, tools: tools.count()? }));
    match counts {
        Ok(counts) => {
            report.stores = Some(counts);
            (StatusCode::OK, Json(report))
        }
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            report.status = HealthStatus::Down;
            report.reason = Some(e.message);
            (StatusCode::SERVICE_UNAVAILABLE, Json(report))
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[test]
    fn test_live_report_omits_store_counts() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(HealthReport::up())?;
        assert_eq!(json["status"], "up");
        assert!(json.get("stores").is_none());
        assert!(json.get("uptimeSecs").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_ready_counts_seeded_tools() -> Result<(), String> {
        let state = AppState::new(ApiConfig::default()).map_err(|e| e.to_string())?;
        let response = create_router()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .map_err(|e| e.to_string())?,
            )
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        let report: HealthReport = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
        assert_eq!(report.stores, Some(StoreCounts { sessions: 0, tools: 7 }));
        Ok(())
    }
}
