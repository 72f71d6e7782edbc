//! Task Service
//!
//! Hierarchical tasks. Parent links are checked under the same write lock
//! as the write they guard, so the hierarchy stays a forest even when
//! requests race.

use chrono::Utc;
use itagent_core::{
    new_entity_id, EntityId, Task, TaskPriority, TaskStatus, TaskType, ValidationError,
};
use itagent_storage::InMemoryRepository;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{CreateTaskRequest, DeletedResponse, TaskFilter, UpdateTaskRequest};
use crate::validation::{parse_optional, ValidateNonEmpty};

#[derive(Debug, Clone, Default)]
pub struct TaskService {
    tasks: InMemoryRepository<Task>,
}

fn task_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::TaskNotFound)
}

fn parent_not_found() -> ApiError {
    ApiError::new(ErrorCode::TaskNotFound, "Parent task not found")
}

fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    filter.session_id.map_or(true, |s| task.session_id == Some(s))
        && filter
            .assigned_to
            .as_deref()
            .map_or(true, |a| task.assigned_to.as_deref() == Some(a))
        && filter.status.as_ref().map_or(true, |s| s.contains(&task.status))
        && filter.priority.as_ref().map_or(true, |p| p.contains(&task.priority))
        && filter.task_type.as_ref().map_or(true, |t| t.contains(&task.task_type))
        && filter
            .parent_task_id
            .map_or(true, |p| task.parent_task_id == Some(p))
}

/// Walk up from `new_parent` and fail if the chain reaches `task_id`.
fn check_no_cycle(
    parents: &HashMap<EntityId, Option<EntityId>>,
    task_id: EntityId,
    new_parent: EntityId,
) -> Result<(), ValidationError> {
    let mut chain = vec![task_id];
    let mut cursor = Some(new_parent);
    while let Some(current) = cursor {
        chain.push(current);
        if current == task_id {
            return Err(ValidationError::CircularReference { ids: chain });
        }
        // A chain longer than the store means the data is already cyclic.
        if chain.len() > parents.len() + 1 {
            return Err(ValidationError::CircularReference { ids: chain });
        }
        cursor = parents.get(&current).copied().flatten();
    }
    Ok(())
}

impl TaskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching tasks, highest priority first, then newest first.
    pub fn list_tasks(&self, filter: &TaskFilter) -> ApiResult<Vec<Task>> {
        let mut tasks = self.tasks.find(|t| matches_filter(t, filter))?;
        tasks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(tasks)
    }

    pub fn create_task(&self, req: CreateTaskRequest) -> ApiResult<Task> {
        let name = req.name.validate_non_empty("name")?;
        let status = parse_optional::<TaskStatus>(req.status.as_deref())?;
        let priority = parse_optional::<TaskPriority>(req.priority.as_deref())?;
        let task_type = parse_optional::<TaskType>(req.task_type.as_deref())?;

        let now = Utc::now();
        let mut task = Task::new(new_entity_id(), name, now);
        task.description = req.description;
        task.priority = priority.unwrap_or_default();
        task.task_type = task_type.unwrap_or_default();
        task.assigned_to = req
            .assigned_to
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        task.session_id = req.session_id;
        task.parent_task_id = req.parent_task_id;
        task.due_date = req.due_date;
        task.tags = req.tags.unwrap_or_default();
        task.metadata = req.metadata.unwrap_or_default();
        if let Some(status) = status {
            task.apply_status(status, now);
        }

        self.tasks.with_write(|tasks| {
            if let Some(parent_id) = task.parent_task_id {
                if !tasks.contains_key(&parent_id) {
                    return Err(parent_not_found());
                }
            }
            tasks.insert(task.id, task.clone());
            Ok::<_, ApiError>(())
        })?;
        tracing::info!(task_id = %task.id, "task created");
        Ok(task)
    }

    /// A single task with its direct children, oldest child first.
    pub fn get_task(&self, id: EntityId) -> ApiResult<Task> {
        let mut task = self.tasks.get(&id)?.ok_or_else(task_not_found)?;
        let mut children = self.tasks.find(|t| t.parent_task_id == Some(id))?;
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        task.sub_tasks = children;
        Ok(task)
    }

    pub fn update_task(&self, id: EntityId, req: UpdateTaskRequest) -> ApiResult<Task> {
        let name = req
            .name
            .as_ref()
            .map(|n| n.validate_non_empty("name"))
            .transpose()?;
        let priority = parse_optional::<TaskPriority>(req.priority.as_deref())?;
        let task_type = parse_optional::<TaskType>(req.task_type.as_deref())?;

        self.tasks.with_write(|tasks| {
            if let Some(parent_id) = req.parent_task_id {
                if !tasks.contains_key(&parent_id) {
                    return Err(parent_not_found());
                }
                let parents: HashMap<_, _> =
                    tasks.values().map(|t| (t.id, t.parent_task_id)).collect();
                check_no_cycle(&parents, id, parent_id)?;
            }

            let task = tasks.get_mut(&id).ok_or_else(task_not_found)?;
            if let Some(name) = name {
                task.name = name;
            }
            if let Some(description) = req.description {
                task.description = Some(description);
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if let Some(task_type) = task_type {
                task.task_type = task_type;
            }
            if let Some(due) = req.due_date {
                task.due_date = Some(due);
            }
            if let Some(tags) = req.tags {
                task.tags = tags;
            }
            if let Some(metadata) = req.metadata {
                task.metadata = metadata;
            }
            if let Some(parent) = req.parent_task_id {
                task.parent_task_id = Some(parent);
            }
            task.updated_at = Utc::now();
            Ok(task.clone())
        })
    }

    /// Remove a leaf task.
    pub fn delete_task(&self, id: EntityId) -> ApiResult<DeletedResponse> {
        self.tasks.with_write(|tasks| {
            if !tasks.contains_key(&id) {
                return Err(task_not_found());
            }
            let children = tasks.values().filter(|t| t.parent_task_id == Some(id)).count();
            if children > 0 {
                return Err(ApiError::validation_failed(format!(
                    "Task has {} sub-task(s); delete or re-parent them first",
                    children
                )));
            }
            tasks.remove(&id);
            Ok(())
        })?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(DeletedResponse { id, deleted: true })
    }

    pub fn assign_task(&self, id: EntityId, agent_id: &str) -> ApiResult<Task> {
        let agent_id = agent_id.validate_non_empty("agentId")?;
        self.tasks
            .update(&id, |task| {
                task.assign(agent_id, Utc::now());
                Ok::<_, ApiError>(task.clone())
            })?
            .ok_or_else(task_not_found)
    }

    pub fn update_task_status(&self, id: EntityId, status: TaskStatus) -> ApiResult<Task> {
        let task = self
            .tasks
            .update(&id, |task| {
                task.apply_status(status, Utc::now());
                Ok::<_, ApiError>(task.clone())
            })?
            .ok_or_else(task_not_found)?;
        tracing::debug!(task_id = %id, status = %status, "task status changed");
        Ok(task)
    }
}
