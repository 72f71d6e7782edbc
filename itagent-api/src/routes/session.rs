//! Session REST API Routes
//!
//! Sessions, their participants, their message streams and the tasks
//! scoped to them. Callers without a token act as the configured default
//! user.

use axum::{extract::State, routing::get, Router};
use itagent_core::{Message, Session, SessionAgent, Task};
use std::sync::Arc;

use crate::{
    config::ApiConfig,
    error::{ApiResult, ErrorEnvelope},
    extractors::{PathId, ValidatedJson, ValidatedQuery},
    middleware::OptionalAuth,
    response::ApiResponse,
    services::{SessionService, TaskService},
    state::AppState,
    types::{
        AddMessageRequest, AddSessionAgentRequest, CreateSessionRequest, CreateTaskRequest,
        TaskListQuery, UpdateSessionRequest,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/sessions - List the caller's sessions
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    responses(
        (status = 200, description = "Sessions owned by the caller, newest first", body = [Session]),
        (status = 401, description = "Invalid token", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_sessions(
    State(sessions): State<Arc<SessionService>>,
    State(config): State<Arc<ApiConfig>>,
    auth: OptionalAuth,
) -> ApiResult<ApiResponse<Vec<Session>>> {
    let user_id = auth.user_id_or(&config.default_user_id);
    Ok(ApiResponse::ok(sessions.list_sessions(&user_id)?))
}

/// POST /api/v1/sessions - Create a session
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created in planning status", body = Session),
        (status = 400, description = "Empty name or unknown strategy", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_session(
    State(sessions): State<Arc<SessionService>>,
    State(config): State<Arc<ApiConfig>>,
    auth: OptionalAuth,
    ValidatedJson(req): ValidatedJson<CreateSessionRequest>,
) -> ApiResult<ApiResponse<Session>> {
    let user_id = auth.user_id_or(&config.default_user_id);
    let session = sessions.create_session(&user_id, req)?;
    Ok(ApiResponse::created(session))
}

/// GET /api/v1/sessions/{id} - Get a session
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session details", body = Session),
        (status = 404, description = "Session not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_session(
    State(sessions): State<Arc<SessionService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Session>> {
    Ok(ApiResponse::ok(sessions.get_session(id)?))
}

/// PATCH /api/v1/sessions/{id} - Update a session
#[utoipa::path(
    patch,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(("id" = String, Path, description = "Session ID")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated", body = Session),
        (status = 400, description = "Invalid field", body = ErrorEnvelope),
        (status = 404, description = "Session not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_session(
    State(sessions): State<Arc<SessionService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<UpdateSessionRequest>,
) -> ApiResult<ApiResponse<Session>> {
    Ok(ApiResponse::ok(sessions.update_session(id, req)?))
}

/// GET /api/v1/sessions/{id}/agents - List session participants
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/agents",
    tag = "Sessions",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Participants", body = [SessionAgent]),
        (status = 404, description = "Session not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_agents(
    State(sessions): State<Arc<SessionService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Vec<SessionAgent>>> {
    Ok(ApiResponse::ok(sessions.list_agents(id)?))
}

/// POST /api/v1/sessions/{id}/agents - Add a participant
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/agents",
    tag = "Sessions",
    params(("id" = String, Path, description = "Session ID")),
    request_body = AddSessionAgentRequest,
    responses(
        (status = 201, description = "Participant added", body = SessionAgent),
        (status = 400, description = "Missing name or role", body = ErrorEnvelope),
        (status = 404, description = "Session not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_agent(
    State(sessions): State<Arc<SessionService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<AddSessionAgentRequest>,
) -> ApiResult<ApiResponse<SessionAgent>> {
    Ok(ApiResponse::created(sessions.add_agent(id, req)?))
}

/// GET /api/v1/sessions/{id}/messages - List messages in arrival order
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/messages",
    tag = "Sessions",
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Messages in arrival order", body = [Message]),
        (status = 404, description = "Session not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_messages(
    State(sessions): State<Arc<SessionService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Vec<Message>>> {
    Ok(ApiResponse::ok(sessions.list_messages(id)?))
}

/// POST /api/v1/sessions/{id}/messages - Post a message
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/messages",
    tag = "Sessions",
    params(("id" = String, Path, description = "Session ID")),
    request_body = AddMessageRequest,
    responses(
        (status = 201, description = "Message appended", body = Message),
        (status = 400, description = "Missing sender or content", body = ErrorEnvelope),
        (status = 404, description = "Session not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_message(
    State(sessions): State<Arc<SessionService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<AddMessageRequest>,
) -> ApiResult<ApiResponse<Message>> {
    Ok(ApiResponse::created(sessions.add_message(id, req)?))
}

/// GET /api/v1/sessions/{id}/tasks - List the session's tasks
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/tasks",
    tag = "Sessions",
    params(
        ("id" = String, Path, description = "Session ID"),
        ("assignedTo" = Option<String>, Query, description = "Filter by assignee"),
        ("status" = Option<String>, Query, description = "Comma-separated statuses"),
        ("priority" = Option<String>, Query, description = "Comma-separated priorities"),
        ("type" = Option<String>, Query, description = "Comma-separated task types"),
    ),
    responses(
        (status = 200, description = "Tasks by priority, then newest first", body = [Task]),
        (status = 400, description = "Unknown filter value", body = ErrorEnvelope),
        (status = 404, description = "Session not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_session_tasks(
    State(sessions): State<Arc<SessionService>>,
    State(tasks): State<Arc<TaskService>>,
    PathId(id): PathId,
    ValidatedQuery(query): ValidatedQuery<TaskListQuery>,
) -> ApiResult<ApiResponse<Vec<Task>>> {
    sessions.require_exists(id)?;
    let mut filter = query.into_filter()?;
    filter.session_id = Some(id);
    Ok(ApiResponse::ok(tasks.list_tasks(&filter)?))
}

/// POST /api/v1/sessions/{id}/tasks - Create a task in the session
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/tasks",
    tag = "Sessions",
    params(("id" = String, Path, description = "Session ID")),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid task", body = ErrorEnvelope),
        (status = 404, description = "Session or parent task not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_session_task(
    State(sessions): State<Arc<SessionService>>,
    State(tasks): State<Arc<TaskService>>,
    PathId(id): PathId,
    ValidatedJson(mut req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    sessions.require_exists(id)?;
    req.session_id = Some(id);
    Ok(ApiResponse::created(tasks.create_task(req)?))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/:id", get(get_session).patch(update_session))
        .route("/:id/agents", get(list_agents).post(add_agent))
        .route("/:id/messages", get(list_messages).post(add_message))
        .route("/:id/tasks", get(list_session_tasks).post(create_session_task))
}
