//! Agent Interaction History Routes
//!
//! The agent id in the path is whatever id the agent uses as message
//! sender or receiver, so it is taken as a plain string.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use itagent_core::{EntityId, Message};
use std::sync::Arc;

use crate::{
    config::ApiConfig,
    error::{ApiResult, ErrorEnvelope},
    extractors::ValidatedQuery,
    response::ApiResponse,
    services::InteractionService,
    state::AppState,
    types::{InteractionListResponse, InteractionQuery, InteractionStats},
};

/// GET /api/v1/agents/{id}/interactions - List an agent's interactions
#[utoipa::path(
    get,
    path = "/api/v1/agents/{id}/interactions",
    tag = "Interactions",
    params(
        ("id" = String, Path, description = "Agent ID"),
        ("sessionId" = Option<String>, Query, description = "Filter by session"),
        ("taskId" = Option<String>, Query, description = "Match metadata.taskId"),
        ("startDate" = Option<String>, Query, description = "Messages at or after (RFC 3339)"),
        ("endDate" = Option<String>, Query, description = "Messages at or before (RFC 3339)"),
        ("types" = Option<String>, Query, description = "Comma-separated message types"),
        ("keywords" = Option<String>, Query, description = "Comma-separated, any-match on content"),
        ("limit" = Option<usize>, Query, description = "Page size"),
        ("offset" = Option<usize>, Query, description = "Entries to skip"),
    ),
    responses(
        (status = 200, description = "Interactions, newest first", body = InteractionListResponse),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_interactions(
    State(interactions): State<Arc<InteractionService>>,
    State(config): State<Arc<ApiConfig>>,
    Path(agent_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<InteractionQuery>,
) -> ApiResult<ApiResponse<InteractionListResponse>> {
    let filter = query.into_filter(config.interaction_page_size)?;
    Ok(ApiResponse::ok(interactions.list(&agent_id, &filter)?))
}

/// GET /api/v1/agents/{id}/interactions/stats - Interaction statistics
#[utoipa::path(
    get,
    path = "/api/v1/agents/{id}/interactions/stats",
    tag = "Interactions",
    params(
        ("id" = String, Path, description = "Agent ID"),
        ("sessionId" = Option<String>, Query, description = "Filter by session"),
        ("startDate" = Option<String>, Query, description = "Messages at or after (RFC 3339)"),
        ("endDate" = Option<String>, Query, description = "Messages at or before (RFC 3339)"),
        ("types" = Option<String>, Query, description = "Comma-separated message types"),
    ),
    responses(
        (status = 200, description = "Aggregated statistics", body = InteractionStats),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn interaction_stats(
    State(interactions): State<Arc<InteractionService>>,
    State(config): State<Arc<ApiConfig>>,
    Path(agent_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<InteractionQuery>,
) -> ApiResult<ApiResponse<InteractionStats>> {
    let filter = query.into_filter(config.interaction_page_size)?;
    Ok(ApiResponse::ok(interactions.stats(&agent_id, &filter)?))
}

/// GET /api/v1/agents/{id}/interactions/export - Download interactions
///
/// Returns the file body directly, not the JSON envelope.
#[utoipa::path(
    get,
    path = "/api/v1/agents/{id}/interactions/export",
    tag = "Interactions",
    params(
        ("id" = String, Path, description = "Agent ID"),
        ("format" = Option<String>, Query, description = "json (default) | csv"),
        ("sessionId" = Option<String>, Query, description = "Filter by session"),
        ("types" = Option<String>, Query, description = "Comma-separated message types"),
        ("keywords" = Option<String>, Query, description = "Comma-separated, any-match on content"),
    ),
    responses(
        (status = 200, description = "Export file", body = String),
        (status = 400, description = "Unknown format or malformed filter", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_interactions(
    State(interactions): State<Arc<InteractionService>>,
    State(config): State<Arc<ApiConfig>>,
    Path(agent_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<InteractionQuery>,
) -> ApiResult<Response> {
    let format = query.export_format()?;
    let filter = query.into_filter(config.interaction_page_size)?;
    let export = interactions.export(&agent_id, &filter, format)?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}

/// GET /api/v1/agents/{id}/interactions/{interaction_id} - One interaction
#[utoipa::path(
    get,
    path = "/api/v1/agents/{id}/interactions/{interaction_id}",
    tag = "Interactions",
    params(
        ("id" = String, Path, description = "Agent ID"),
        ("interaction_id" = String, Path, description = "Message ID"),
    ),
    responses(
        (status = 200, description = "Interaction details", body = Message),
        (status = 403, description = "Agent is neither sender nor receiver", body = ErrorEnvelope),
        (status = 404, description = "Interaction not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_interaction(
    State(interactions): State<Arc<InteractionService>>,
    Path((agent_id, interaction_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Message>> {
    let interaction_id: EntityId = interaction_id.parse()?;
    Ok(ApiResponse::ok(interactions.detail(&agent_id, interaction_id)?))
}

/// Routes mounted under `/agents/:id/interactions`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/:id/interactions", get(list_interactions))
        .route("/:id/interactions/stats", get(interaction_stats))
        .route("/:id/interactions/export", get(export_interactions))
        .route("/:id/interactions/:interaction_id", get(get_interaction))
}
