//! Agent Capability REST API Routes

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use itagent_core::Capability;
use std::sync::Arc;

use crate::{
    error::{ApiResult, ErrorEnvelope},
    extractors::{PathId, ValidatedJson, ValidatedQuery},
    middleware::OptionalAuth,
    response::ApiResponse,
    services::CapabilityService,
    state::AppState,
    types::{
        CapabilityListQuery, CapabilityRatingResponse, CreateCapabilityRequest, RateRequest,
        RecommendQuery, RecommendResponse,
    },
};

/// GET /api/v1/agents/capabilities - List capabilities
#[utoipa::path(
    get,
    path = "/api/v1/agents/capabilities",
    tag = "Capabilities",
    params(("type" = Option<String>, Query, description = "tool | knowledge | reasoning | communication | custom")),
    responses(
        (status = 200, description = "Capabilities ordered by name", body = [Capability]),
        (status = 400, description = "Unknown type", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_capabilities(
    State(capabilities): State<Arc<CapabilityService>>,
    ValidatedQuery(query): ValidatedQuery<CapabilityListQuery>,
) -> ApiResult<ApiResponse<Vec<Capability>>> {
    let listed = capabilities.list_capabilities(query.capability_type.as_deref())?;
    Ok(ApiResponse::ok(listed))
}

/// POST /api/v1/agents/capabilities - Create a capability
#[utoipa::path(
    post,
    path = "/api/v1/agents/capabilities",
    tag = "Capabilities",
    request_body = CreateCapabilityRequest,
    responses(
        (status = 201, description = "Capability created", body = Capability),
        (status = 400, description = "Missing name or unknown type", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_capability(
    State(capabilities): State<Arc<CapabilityService>>,
    ValidatedJson(req): ValidatedJson<CreateCapabilityRequest>,
) -> ApiResult<ApiResponse<Capability>> {
    Ok(ApiResponse::created(capabilities.create_capability(req)?))
}

/// GET /api/v1/agents/capabilities/recommend - Recommend capabilities for a role
#[utoipa::path(
    get,
    path = "/api/v1/agents/capabilities/recommend",
    tag = "Capabilities",
    params(("role" = String, Query, description = "Agent role, e.g. assistant or tool_user")),
    responses(
        (status = 200, description = "Recommended capabilities", body = RecommendResponse),
        (status = 400, description = "Missing role parameter", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn recommend_capabilities(
    State(capabilities): State<Arc<CapabilityService>>,
    ValidatedQuery(query): ValidatedQuery<RecommendQuery>,
) -> ApiResult<ApiResponse<RecommendResponse>> {
    Ok(ApiResponse::ok(capabilities.recommend(query.role.as_deref())?))
}

/// GET /api/v1/agents/capabilities/{id} - Get a capability
#[utoipa::path(
    get,
    path = "/api/v1/agents/capabilities/{id}",
    tag = "Capabilities",
    params(("id" = String, Path, description = "Capability ID")),
    responses(
        (status = 200, description = "Capability details", body = Capability),
        (status = 404, description = "Capability not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_capability(
    State(capabilities): State<Arc<CapabilityService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Capability>> {
    Ok(ApiResponse::ok(capabilities.get_capability(id)?))
}

/// POST /api/v1/agents/capabilities/{id}/rate - Rate a capability
#[utoipa::path(
    post,
    path = "/api/v1/agents/capabilities/{id}/rate",
    tag = "Capabilities",
    params(("id" = String, Path, description = "Capability ID")),
    request_body = RateRequest,
    responses(
        (status = 200, description = "New rating aggregate", body = CapabilityRatingResponse),
        (status = 400, description = "Rating out of range", body = ErrorEnvelope),
        (status = 404, description = "Capability not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rate_capability(
    State(capabilities): State<Arc<CapabilityService>>,
    auth: OptionalAuth,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<RateRequest>,
) -> ApiResult<ApiResponse<CapabilityRatingResponse>> {
    let user_id = req
        .user_id
        .or_else(|| auth.0.map(|ctx| ctx.user_id));
    let out = capabilities.rate_capability(id, req.rating, user_id.as_deref())?;
    Ok(ApiResponse::ok(out))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_capabilities).post(create_capability))
        .route("/recommend", get(recommend_capabilities))
        .route("/:id", get(get_capability))
        .route("/:id/rate", post(rate_capability))
}
