//! Agent Team REST API Routes
//!
//! Every handler takes [`AuthExtractor`], so unauthenticated requests are
//! rejected with 401 before input validation. Ownership is enforced by
//! [`TeamService`].

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use itagent_core::Team;
use std::sync::Arc;

use crate::{
    error::{ApiResult, ErrorEnvelope},
    extractors::{PathId, PathIds, ValidatedJson},
    middleware::AuthExtractor,
    response::ApiResponse,
    services::TeamService,
    state::AppState,
    types::{
        AddTeamMemberRequest, CreateTeamRequest, DeletedResponse, StartTeamRequest,
        StartTeamResponse, TeamMemberResponse, UpdateTeamMemberRequest, UpdateTeamRequest,
    },
};

// ============================================================================
// TEAMS
// ============================================================================

/// GET /api/v1/agents/teams - List the caller's teams
#[utoipa::path(
    get,
    path = "/api/v1/agents/teams",
    tag = "Teams",
    responses(
        (status = 200, description = "Teams created by the caller", body = [Team]),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_teams(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<ApiResponse<Vec<Team>>> {
    Ok(ApiResponse::ok(teams.list_teams(&auth.user_id)?))
}

/// POST /api/v1/agents/teams - Create a team
#[utoipa::path(
    post,
    path = "/api/v1/agents/teams",
    tag = "Teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 400, description = "Missing name or type", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_team(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    ValidatedJson(req): ValidatedJson<CreateTeamRequest>,
) -> ApiResult<ApiResponse<Team>> {
    Ok(ApiResponse::created(teams.create_team(&auth.user_id, req)?))
}

/// GET /api/v1/agents/teams/{id} - Get a team
#[utoipa::path(
    get,
    path = "/api/v1/agents/teams/{id}",
    tag = "Teams",
    params(("id" = String, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = Team),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the team", body = ErrorEnvelope),
        (status = 404, description = "Team not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_team(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Team>> {
    Ok(ApiResponse::ok(teams.get_team(id, &auth.user_id)?))
}

/// PUT /api/v1/agents/teams/{id} - Update a team
#[utoipa::path(
    put,
    path = "/api/v1/agents/teams/{id}",
    tag = "Teams",
    params(("id" = String, Path, description = "Team ID")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = Team),
        (status = 400, description = "Invalid field", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the team", body = ErrorEnvelope),
        (status = 404, description = "Team not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_team(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<UpdateTeamRequest>,
) -> ApiResult<ApiResponse<Team>> {
    Ok(ApiResponse::ok(teams.update_team(id, &auth.user_id, req)?))
}

/// DELETE /api/v1/agents/teams/{id} - Delete a team
#[utoipa::path(
    delete,
    path = "/api/v1/agents/teams/{id}",
    tag = "Teams",
    params(("id" = String, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team deleted", body = DeletedResponse),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the team", body = ErrorEnvelope),
        (status = 404, description = "Team not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_team(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<DeletedResponse>> {
    Ok(ApiResponse::ok(teams.delete_team(id, &auth.user_id)?))
}

// ============================================================================
// MEMBERS
// ============================================================================

/// POST /api/v1/agents/teams/{id}/members - Add a member
#[utoipa::path(
    post,
    path = "/api/v1/agents/teams/{id}/members",
    tag = "Teams",
    params(("id" = String, Path, description = "Team ID")),
    request_body = AddTeamMemberRequest,
    responses(
        (status = 200, description = "Member added", body = TeamMemberResponse),
        (status = 400, description = "Missing configId or unknown role", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the team", body = ErrorEnvelope),
        (status = 404, description = "Team not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<AddTeamMemberRequest>,
) -> ApiResult<ApiResponse<TeamMemberResponse>> {
    Ok(ApiResponse::ok(teams.add_member(id, &auth.user_id, req)?))
}

/// PUT /api/v1/agents/teams/{id}/members/{member_id} - Update a member
#[utoipa::path(
    put,
    path = "/api/v1/agents/teams/{id}/members/{member_id}",
    tag = "Teams",
    params(
        ("id" = String, Path, description = "Team ID"),
        ("member_id" = String, Path, description = "Member ID"),
    ),
    request_body = UpdateTeamMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = TeamMemberResponse),
        (status = 400, description = "Unknown role", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the team", body = ErrorEnvelope),
        (status = 404, description = "Team or member not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_member(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    PathIds(id, member_id): PathIds,
    ValidatedJson(req): ValidatedJson<UpdateTeamMemberRequest>,
) -> ApiResult<ApiResponse<TeamMemberResponse>> {
    Ok(ApiResponse::ok(
        teams.update_member(id, member_id, &auth.user_id, req)?,
    ))
}

/// DELETE /api/v1/agents/teams/{id}/members/{member_id} - Remove a member
#[utoipa::path(
    delete,
    path = "/api/v1/agents/teams/{id}/members/{member_id}",
    tag = "Teams",
    params(
        ("id" = String, Path, description = "Team ID"),
        ("member_id" = String, Path, description = "Member ID"),
    ),
    responses(
        (status = 200, description = "Team without the member", body = Team),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the team", body = ErrorEnvelope),
        (status = 404, description = "Team or member not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    PathIds(id, member_id): PathIds,
) -> ApiResult<ApiResponse<Team>> {
    Ok(ApiResponse::ok(teams.remove_member(id, member_id, &auth.user_id)?))
}

// ============================================================================
// START
// ============================================================================

/// POST /api/v1/agents/teams/{id}/start - Start a team session
#[utoipa::path(
    post,
    path = "/api/v1/agents/teams/{id}/start",
    tag = "Teams",
    params(("id" = String, Path, description = "Team ID")),
    request_body = StartTeamRequest,
    responses(
        (status = 200, description = "Session created for the team", body = StartTeamResponse),
        (status = 400, description = "Archived team or too few members", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Caller does not own the team", body = ErrorEnvelope),
        (status = 404, description = "Team not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn start_team(
    State(teams): State<Arc<TeamService>>,
    AuthExtractor(auth): AuthExtractor,
    PathId(id): PathId,
    body: Option<ValidatedJson<StartTeamRequest>>,
) -> ApiResult<ApiResponse<StartTeamResponse>> {
    let req = body.map(|ValidatedJson(req)| req).unwrap_or_default();
    Ok(ApiResponse::ok(teams.start_team(id, &auth.user_id, req)?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teams).post(create_team))
        .route("/:id", get(get_team).put(update_team).delete(delete_team))
        .route("/:id/members", post(add_member))
        .route("/:id/members/:member_id", put(update_member).delete(remove_member))
        .route("/:id/start", post(start_team))
}
