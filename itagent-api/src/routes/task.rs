//! Task REST API Routes

use axum::{
    extract::State,
    routing::{get, patch, post},
    Router,
};
use itagent_core::{Task, TaskStatus};
use std::sync::Arc;

use crate::{
    error::{ApiResult, ErrorEnvelope},
    extractors::{PathId, ValidatedJson, ValidatedQuery},
    response::ApiResponse,
    services::TaskService,
    state::AppState,
    types::{
        AssignTaskRequest, CreateTaskRequest, DeletedResponse, TaskListQuery,
        UpdateTaskRequest, UpdateTaskStatusRequest,
    },
    validation::ValidateNonEmpty,
};

/// GET /api/v1/tasks - List tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "Tasks",
    params(
        ("sessionId" = Option<String>, Query, description = "Filter by session"),
        ("assignedTo" = Option<String>, Query, description = "Filter by assignee"),
        ("status" = Option<String>, Query, description = "Comma-separated statuses"),
        ("priority" = Option<String>, Query, description = "Comma-separated priorities"),
        ("type" = Option<String>, Query, description = "Comma-separated task types"),
        ("parentTaskId" = Option<String>, Query, description = "Filter by parent task"),
    ),
    responses(
        (status = 200, description = "Tasks by priority, then newest first", body = [Task]),
        (status = 400, description = "Unknown filter value", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tasks(
    State(tasks): State<Arc<TaskService>>,
    ValidatedQuery(query): ValidatedQuery<TaskListQuery>,
) -> ApiResult<ApiResponse<Vec<Task>>> {
    let filter = query.into_filter()?;
    Ok(ApiResponse::ok(tasks.list_tasks(&filter)?))
}

/// POST /api/v1/tasks - Create a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "Tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid task", body = ErrorEnvelope),
        (status = 404, description = "Parent task not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    State(tasks): State<Arc<TaskService>>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    Ok(ApiResponse::created(tasks.create_task(req)?))
}

/// GET /api/v1/tasks/{id} - Get a task with its sub-tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task details", body = Task),
        (status = 404, description = "Task not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_task(
    State(tasks): State<Arc<TaskService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Task>> {
    Ok(ApiResponse::ok(tasks.get_task(id)?))
}

/// PATCH /api/v1/tasks/{id} - Update a task
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Invalid field or parent cycle", body = ErrorEnvelope),
        (status = 404, description = "Task not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    State(tasks): State<Arc<TaskService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    Ok(ApiResponse::ok(tasks.update_task(id, req)?))
}

/// DELETE /api/v1/tasks/{id} - Delete a task without sub-tasks
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = DeletedResponse),
        (status = 400, description = "Task still has sub-tasks", body = ErrorEnvelope),
        (status = 404, description = "Task not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    State(tasks): State<Arc<TaskService>>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<DeletedResponse>> {
    Ok(ApiResponse::ok(tasks.delete_task(id)?))
}

/// POST /api/v1/tasks/{id}/assign - Assign a task to an agent
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/assign",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = AssignTaskRequest,
    responses(
        (status = 200, description = "Task assigned", body = Task),
        (status = 400, description = "Missing agentId", body = ErrorEnvelope),
        (status = 404, description = "Task not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_task(
    State(tasks): State<Arc<TaskService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<AssignTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    let agent_id = req.agent_id.validate_non_empty("agentId")?;
    Ok(ApiResponse::ok(tasks.assign_task(id, &agent_id)?))
}

/// PATCH /api/v1/tasks/{id}/status - Change a task's status
///
/// Also reachable with POST.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}/status",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Task),
        (status = 400, description = "Missing or unknown status", body = ErrorEnvelope),
        (status = 404, description = "Task not found", body = ErrorEnvelope),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_task_status(
    State(tasks): State<Arc<TaskService>>,
    PathId(id): PathId,
    ValidatedJson(req): ValidatedJson<UpdateTaskStatusRequest>,
) -> ApiResult<ApiResponse<Task>> {
    let status: TaskStatus = req.status.validate_non_empty("status")?.parse()?;
    Ok(ApiResponse::ok(tasks.update_task_status(id, status)?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).patch(update_task).delete(delete_task))
        .route("/:id/assign", post(assign_task))
        .route("/:id/status", patch(update_task_status).post(update_task_status))
}
