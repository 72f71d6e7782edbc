//! Tool REST API Routes
//!
//! Catalog browsing and registration, real invocation through
//! `POST /tools/call`, and the simulated `POST /tools/execute`.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use itagent_core::{Tool, ToolAction};
use std::sync::Arc;

use crate::{
    config::ApiConfig,
    error::{ApiResult, ErrorEnvelope},
    extractors::{ValidatedJson, ValidatedQuery},
    response::ApiResponse,
    services::ToolService,
    state::AppState,
    types::{
        CallToolRequest, CallToolResponse, ExecuteToolRequest, ExecuteToolResponse,
        RegisterToolRequest, ToolExecutionsPage, ToolExecutionsQuery, ToolListQuery,
        ToolListResponse,
    },
};

// ============================================================================
// CATALOG
// ============================================================================

/// GET /api/v1/tools - List tools
#[utoipa::path(
    get,
    path = "/api/v1/tools",
    tag = "Tools",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on name, description and tags"),
        ("enabled" = Option<bool>, Query, description = "Filter by enabled flag"),
        ("limit" = Option<usize>, Query, description = "Maximum number of results"),
    ),
    responses(
        (status = 200, description = "Tools ordered by name", body = ToolListResponse),
        (status = 400, description = "Unknown category", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tools(
    State(tools): State<Arc<ToolService>>,
    State(config): State<Arc<ApiConfig>>,
    ValidatedQuery(query): ValidatedQuery<ToolListQuery>,
) -> ApiResult<ApiResponse<ToolListResponse>> {
    let filter = query.into_filter(config.tool_list_limit)?;
    Ok(ApiResponse::ok(tools.list_tools(&filter)?))
}

/// POST /api/v1/tools - Register a tool
#[utoipa::path(
    post,
    path = "/api/v1/tools",
    tag = "Tools",
    request_body = RegisterToolRequest,
    responses(
        (status = 201, description = "Tool registered", body = Tool),
        (status = 400, description = "Missing name, description or category", body = ErrorEnvelope),
        (status = 409, description = "Tool id or name already taken", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_tool(
    State(tools): State<Arc<ToolService>>,
    ValidatedJson(req): ValidatedJson<RegisterToolRequest>,
) -> ApiResult<ApiResponse<Tool>> {
    Ok(ApiResponse::created(tools.register_tool(req)?))
}

/// GET /api/v1/tools/{id} - Get a tool
#[utoipa::path(
    get,
    path = "/api/v1/tools/{id}",
    tag = "Tools",
    params(("id" = String, Path, description = "Tool slug")),
    responses(
        (status = 200, description = "Tool details", body = Tool),
        (status = 404, description = "Tool not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_tool(
    State(tools): State<Arc<ToolService>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Tool>> {
    Ok(ApiResponse::ok(tools.get_tool(&id)?))
}

/// GET /api/v1/tools/{id}/actions - List a tool's actions
#[utoipa::path(
    get,
    path = "/api/v1/tools/{id}/actions",
    tag = "Tools",
    params(("id" = String, Path, description = "Tool slug")),
    responses(
        (status = 200, description = "Available actions", body = [ToolAction]),
        (status = 404, description = "Tool not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_actions(
    State(tools): State<Arc<ToolService>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Vec<ToolAction>>> {
    Ok(ApiResponse::ok(tools.list_actions(&id)?))
}

/// GET /api/v1/tools/{id}/executions - Page through a tool's call history
#[utoipa::path(
    get,
    path = "/api/v1/tools/{id}/executions",
    tag = "Tools",
    params(
        ("id" = String, Path, description = "Tool slug"),
        ("status" = Option<String>, Query, description = "success | error"),
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("pageSize" = Option<usize>, Query, description = "Page size, at most 100"),
    ),
    responses(
        (status = 200, description = "Executions, newest first", body = ToolExecutionsPage),
        (status = 404, description = "Tool not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_executions(
    State(tools): State<Arc<ToolService>>,
    Path(id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ToolExecutionsQuery>,
) -> ApiResult<ApiResponse<ToolExecutionsPage>> {
    Ok(ApiResponse::ok(tools.list_executions(&id, query)?))
}

// ============================================================================
// INVOCATION
// ============================================================================

/// POST /api/v1/tools/call - Invoke a tool
#[utoipa::path(
    post,
    path = "/api/v1/tools/call",
    tag = "Tools",
    request_body = CallToolRequest,
    responses(
        (status = 200, description = "Tool result", body = CallToolResponse),
        (status = 400, description = "Missing fields, disabled tool or invalid parameters", body = ErrorEnvelope),
        (status = 403, description = "Permission denied", body = ErrorEnvelope),
        (status = 404, description = "Tool not found", body = ErrorEnvelope),
        (status = 500, description = "Tool execution failed", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn call_tool(
    State(tools): State<Arc<ToolService>>,
    ValidatedJson(req): ValidatedJson<CallToolRequest>,
) -> ApiResult<ApiResponse<CallToolResponse>> {
    Ok(ApiResponse::ok(tools.call_tool(req).await?))
}

/// POST /api/v1/tools/execute - Simulated execution
///
/// The response body is the execution envelope itself.
#[utoipa::path(
    post,
    path = "/api/v1/tools/execute",
    tag = "Tools",
    request_body = ExecuteToolRequest,
    responses(
        (status = 200, description = "Simulated execution envelope", body = ExecuteToolResponse),
        (status = 400, description = "Missing tool id", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn execute_tool(
    State(tools): State<Arc<ToolService>>,
    ValidatedJson(req): ValidatedJson<ExecuteToolRequest>,
) -> ApiResult<Json<ExecuteToolResponse>> {
    Ok(Json(tools.execute_tool(req)?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tools).post(register_tool))
        .route("/call", post(call_tool))
        .route("/execute", post(execute_tool))
        .route("/:id", get(get_tool))
        .route("/:id/actions", get(list_actions))
        .route("/:id/executions", get(list_executions))
}
