//! Agent Template REST API Routes

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use itagent_core::AgentTemplate;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult, ErrorEnvelope},
    extractors::{PathId, ValidatedJson, ValidatedQuery},
    middleware::OptionalAuth,
    response::ApiResponse,
    services::TemplateService,
    state::AppState,
    types::{
        CreateTemplateRequest, DeletedResponse, RateRequest, TemplateListQuery, TemplateListing,
        TemplateRatingResponse, UpdateTemplateRequest,
    },
};

/// Rater id: the body's `userId`, else the authenticated caller.
fn rater(req: &RateRequest, auth: &OptionalAuth) -> Option<String> {
    req.user_id
        .clone()
        .or_else(|| auth.0.as_ref().map(|ctx| ctx.user_id.clone()))
}

/// GET /api/v1/agents/templates - List templates
#[utoipa::path(
    get,
    path = "/api/v1/agents/templates",
    tag = "Templates",
    params(
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("tag" = Option<String>, Query, description = "Filter by tag"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("search" = Option<String>, Query, description = "Match name, description or tags"),
        ("popular" = Option<bool>, Query, description = "Most used templates"),
        ("recommended" = Option<bool>, Query, description = "Featured templates in order"),
        ("rated" = Option<bool>, Query, description = "Highest rated templates"),
        ("categories" = Option<bool>, Query, description = "Category names only"),
        ("byCategory" = Option<bool>, Query, description = "Templates grouped by category"),
        ("limit" = Option<usize>, Query, description = "Size of the popular, recommended and rated lists"),
    ),
    responses(
        (status = 200, description = "Templates ordered by name, or the requested gallery view", body = [AgentTemplate]),
        (status = 400, description = "Unknown category", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_templates(
    State(templates): State<Arc<TemplateService>>,
    ValidatedQuery(query): ValidatedQuery<TemplateListQuery>,
) -> ApiResult<ApiResponse<TemplateListing>> {
    Ok(ApiResponse::ok(templates.list_view(&query)?))
}

/// POST /api/v1/agents/templates - Create a template
#[utoipa::path(
    post,
    path = "/api/v1/agents/templates",
    tag = "Templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = AgentTemplate),
        (status = 400, description = "Missing name or role, or malformed import data", body = ErrorEnvelope),
        (status = 404, description = "Template to clone not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_template(
    State(templates): State<Arc<TemplateService>>,
    auth: OptionalAuth,
    ValidatedJson(req): ValidatedJson<CreateTemplateRequest>,
) -> ApiResult<ApiResponse<AgentTemplate>> {
    let created_by = auth.0.as_ref().map(|ctx| ctx.user_id.as_str());
    Ok(ApiResponse::created(templates.create_template(created_by, req)?))
}

/// GET /api/v1/agents/templates/{id} - Get a template
#[utoipa::path(
    get,
    path = "/api/v1/agents/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template details", body = AgentTemplate),
        (status = 404, description = "Template not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_template(
    State(templates): State<Arc<TemplateService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<AgentTemplate>> {
    Ok(ApiResponse::ok(templates.get_template(id)?))
}

/// GET /api/v1/agents/templates/{id}/export - Template as a JSON document
#[utoipa::path(
    get,
    path = "/api/v1/agents/templates/{id}/export",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Pretty-printed template JSON", body = String),
        (status = 404, description = "Template not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_template(
    State(templates): State<Arc<TemplateService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<String>> {
    Ok(ApiResponse::ok(templates.export_template(id)?))
}

/// PATCH /api/v1/agents/templates/{id} - Update a template
#[utoipa::path(
    patch,
    path = "/api/v1/agents/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = AgentTemplate),
        (status = 400, description = "Empty name or role", body = ErrorEnvelope),
        (status = 404, description = "Template not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_template(
    State(templates): State<Arc<TemplateService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<UpdateTemplateRequest>,
) -> ApiResult<ApiResponse<AgentTemplate>> {
    Ok(ApiResponse::ok(templates.update_template(id, req)?))
}

/// DELETE /api/v1/agents/templates/{id} - Delete a template
#[utoipa::path(
    delete,
    path = "/api/v1/agents/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template deleted", body = DeletedResponse),
        (status = 404, description = "Template not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_template(
    State(templates): State<Arc<TemplateService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<DeletedResponse>> {
    Ok(ApiResponse::ok(templates.delete_template(id)?))
}

/// POST /api/v1/agents/templates/rate - Rate a template named in the body
#[utoipa::path(
    post,
    path = "/api/v1/agents/templates/rate",
    tag = "Templates",
    request_body = RateRequest,
    responses(
        (status = 200, description = "New rating aggregate", body = TemplateRatingResponse),
        (status = 400, description = "Missing templateId or rating out of range", body = ErrorEnvelope),
        (status = 404, description = "Template not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rate_template(
    State(templates): State<Arc<TemplateService>>,
    auth: OptionalAuth,
    ValidatedJson(req): ValidatedJson<RateRequest>,
) -> ApiResult<ApiResponse<TemplateRatingResponse>> {
    let id = req
        .template_id
        .ok_or_else(|| ApiError::missing_field("templateId"))?;
    let user_id = rater(&req, &auth);
    let out = templates.rate_template(id, req.rating, user_id.as_deref())?;
    Ok(ApiResponse::ok(out))
}

/// POST /api/v1/agents/templates/rate/{id} - Rate a template by path
#[utoipa::path(
    post,
    path = "/api/v1/agents/templates/rate/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    request_body = RateRequest,
    responses(
        (status = 200, description = "New rating aggregate", body = TemplateRatingResponse),
        (status = 400, description = "Rating out of range", body = ErrorEnvelope),
        (status = 404, description = "Template not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rate_template_by_id(
    State(templates): State<Arc<TemplateService>>,
    auth: OptionalAuth,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<RateRequest>,
) -> ApiResult<ApiResponse<TemplateRatingResponse>> {
    let user_id = rater(&req, &auth);
    let out = templates.rate_template(id, req.rating, user_id.as_deref())?;
    Ok(ApiResponse::ok(out))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route("/rate", post(rate_template))
        .route("/rate/:id", post(rate_template_by_id))
        .route("/:id/export", get(export_template))
        .route(
            "/:id",
            get(get_template).patch(update_template).delete(delete_template),
        )
}
