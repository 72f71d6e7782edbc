//! Tool Log REST API Routes

use axum::{extract::State, routing::get, Router};
use itagent_core::ToolLog;
use std::sync::Arc;

use crate::{
    config::ApiConfig,
    error::{ApiResult, ErrorEnvelope},
    extractors::{PathId, ValidatedQuery},
    response::ApiResponse,
    services::ToolLogService,
    state::AppState,
    types::{ClearLogsQuery, ClearLogsResponse, ToolLogQuery},
};

/// GET /api/v1/tool-logs - Query tool logs
///
/// `recent` overrides every other field; a lone `sessionId` returns that
/// session's logs; anything else is an AND filter.
#[utoipa::path(
    get,
    path = "/api/v1/tool-logs",
    tag = "Tool Logs",
    params(
        ("toolId" = Option<String>, Query, description = "Filter by tool"),
        ("sessionId" = Option<String>, Query, description = "Filter by session"),
        ("agentId" = Option<String>, Query, description = "Filter by agent"),
        ("status" = Option<String>, Query, description = "success | error"),
        ("startTime" = Option<String>, Query, description = "Logs started at or after (RFC 3339)"),
        ("endTime" = Option<String>, Query, description = "Logs ended at or before (RFC 3339)"),
        ("recent" = Option<String>, Query, description = "Return only the n newest logs"),
    ),
    responses(
        (status = 200, description = "Logs, newest first", body = [ToolLog]),
        (status = 400, description = "Malformed query", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn query_logs(
    State(logs): State<Arc<ToolLogService>>,
    ValidatedQuery(query): ValidatedQuery<ToolLogQuery>,
) -> ApiResult<ApiResponse<Vec<ToolLog>>> {
    Ok(ApiResponse::ok(logs.query(&query)?))
}

/// DELETE /api/v1/tool-logs - Drop logs older than the retention window
#[utoipa::path(
    delete,
    path = "/api/v1/tool-logs",
    tag = "Tool Logs",
    params(("days" = Option<i64>, Query, description = "Retention in days, defaults to the configured window")),
    responses(
        (status = 200, description = "Number of logs removed", body = ClearLogsResponse),
        (status = 400, description = "Negative retention", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_old_logs(
    State(logs): State<Arc<ToolLogService>>,
    State(config): State<Arc<ApiConfig>>,
    ValidatedQuery(query): ValidatedQuery<ClearLogsQuery>,
) -> ApiResult<ApiResponse<ClearLogsResponse>> {
    let days = query.days.unwrap_or(config.log_retention_days);
    let removed = logs.clear_old_logs(days)?;
    Ok(ApiResponse::ok(ClearLogsResponse { removed }))
}

/// GET /api/v1/tool-logs/{id} - Get one log entry
#[utoipa::path(
    get,
    path = "/api/v1/tool-logs/{id}",
    tag = "Tool Logs",
    params(("id" = String, Path, description = "Tool log ID")),
    responses(
        (status = 200, description = "Log entry", body = ToolLog),
        (status = 404, description = "Tool log not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_log(
    State(logs): State<Arc<ToolLogService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<ToolLog>> {
    Ok(ApiResponse::ok(logs.get_log(id)?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(query_logs).delete(clear_old_logs))
        .route("/:id", get(get_log))
}
