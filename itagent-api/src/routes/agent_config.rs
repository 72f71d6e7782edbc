//! Agent Config REST API Routes

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use itagent_core::AgentConfig;
use std::sync::Arc;

use crate::{
    error::{ApiResult, ErrorEnvelope},
    extractors::{PathId, ValidatedJson, ValidatedQuery},
    response::ApiResponse,
    services::AgentConfigService,
    state::AppState,
    types::{
        AgentConfigListQuery, AgentRoleTemplate, CreateAgentConfigRequest, DeletedResponse,
        UpdateAgentConfigRequest,
    },
};

/// GET /api/v1/agents/config - List agent configurations
#[utoipa::path(
    get,
    path = "/api/v1/agents/config",
    tag = "Agent Configs",
    params(("role" = Option<String>, Query, description = "Filter by role")),
    responses(
        (status = 200, description = "Configurations, most recently updated first", body = [AgentConfig]),
        (status = 400, description = "Unknown role", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_configs(
    State(configs): State<Arc<AgentConfigService>>,
    ValidatedQuery(query): ValidatedQuery<AgentConfigListQuery>,
) -> ApiResult<ApiResponse<Vec<AgentConfig>>> {
    Ok(ApiResponse::ok(configs.list_configs(&query)?))
}

/// POST /api/v1/agents/config - Create an agent configuration
#[utoipa::path(
    post,
    path = "/api/v1/agents/config",
    tag = "Agent Configs",
    request_body = CreateAgentConfigRequest,
    responses(
        (status = 201, description = "Configuration created", body = AgentConfig),
        (status = 400, description = "Missing name, role or systemMessage", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_config(
    State(configs): State<Arc<AgentConfigService>>,
    ValidatedJson(req): ValidatedJson<CreateAgentConfigRequest>,
) -> ApiResult<ApiResponse<AgentConfig>> {
    Ok(ApiResponse::created(configs.create_config(req)?))
}

/// GET /api/v1/agents/config/roles/{role} - Starter values for a role
#[utoipa::path(
    get,
    path = "/api/v1/agents/config/roles/{role}",
    tag = "Agent Configs",
    params(("role" = String, Path, description = "Agent role")),
    responses(
        (status = 200, description = "Default color and system message", body = AgentRoleTemplate),
        (status = 400, description = "Unknown role", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn role_template(
    State(configs): State<Arc<AgentConfigService>>,
    Path(role): Path<String>,
) -> ApiResult<ApiResponse<AgentRoleTemplate>> {
    Ok(ApiResponse::ok(configs.role_template(&role)?))
}

/// GET /api/v1/agents/config/{id} - Get an agent configuration
#[utoipa::path(
    get,
    path = "/api/v1/agents/config/{id}",
    tag = "Agent Configs",
    params(("id" = String, Path, description = "Config ID")),
    responses(
        (status = 200, description = "Configuration details", body = AgentConfig),
        (status = 404, description = "Agent config not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_config(
    State(configs): State<Arc<AgentConfigService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<AgentConfig>> {
    Ok(ApiResponse::ok(configs.get_config(id)?))
}

/// PUT /api/v1/agents/config/{id} - Update an agent configuration
#[utoipa::path(
    put,
    path = "/api/v1/agents/config/{id}",
    tag = "Agent Configs",
    params(("id" = String, Path, description = "Config ID")),
    request_body = UpdateAgentConfigRequest,
    responses(
        (status = 200, description = "Configuration updated", body = AgentConfig),
        (status = 400, description = "Blank name or unknown role", body = ErrorEnvelope),
        (status = 404, description = "Agent config not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_config(
    State(configs): State<Arc<AgentConfigService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<UpdateAgentConfigRequest>,
) -> ApiResult<ApiResponse<AgentConfig>> {
    Ok(ApiResponse::ok(configs.update_config(id, req)?))
}

/// DELETE /api/v1/agents/config/{id} - Delete an agent configuration
#[utoipa::path(
    delete,
    path = "/api/v1/agents/config/{id}",
    tag = "Agent Configs",
    params(("id" = String, Path, description = "Config ID")),
    responses(
        (status = 200, description = "Configuration deleted", body = DeletedResponse),
        (status = 404, description = "Agent config not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_config(
    State(configs): State<Arc<AgentConfigService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<DeletedResponse>> {
    Ok(ApiResponse::ok(configs.delete_config(id)?))
}

/// POST /api/v1/agents/config/{id}/clone - Copy an agent configuration
#[utoipa::path(
    post,
    path = "/api/v1/agents/config/{id}/clone",
    tag = "Agent Configs",
    params(("id" = String, Path, description = "Config ID")),
    responses(
        (status = 201, description = "Copy created", body = AgentConfig),
        (status = 404, description = "Agent config not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clone_config(
    State(configs): State<Arc<AgentConfigService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<AgentConfig>> {
    Ok(ApiResponse::created(configs.clone_config(id)?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_configs).post(create_config))
        .route("/roles/:role", get(role_template))
        .route(
            "/:id",
            get(get_config).put(update_config).delete(delete_config),
        )
        .route("/:id/clone", post(clone_config))
}
