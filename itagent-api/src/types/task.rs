//! Task-related API types

use itagent_core::{EntityId, Metadata, TaskPriority, TaskStatus, TaskType, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ApiResult;
use crate::validation::parse_csv_list;

/// Raw `GET /tasks` query string. List fields are comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub session_id: Option<EntityId>,
    pub assigned_to: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub parent_task_id: Option<EntityId>,
}

/// Typed task filter; every present field must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub session_id: Option<EntityId>,
    pub assigned_to: Option<String>,
    pub status: Option<Vec<TaskStatus>>,
    pub priority: Option<Vec<TaskPriority>>,
    pub task_type: Option<Vec<TaskType>>,
    pub parent_task_id: Option<EntityId>,
}

impl TaskListQuery {
    pub fn into_filter(self) -> ApiResult<TaskFilter> {
        Ok(TaskFilter {
            session_id: self.session_id,
            assigned_to: self
                .assigned_to
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            status: parse_csv_list(self.status.as_deref())?,
            priority: parse_csv_list(self.priority.as_deref())?,
            task_type: parse_csv_list(self.task_type.as_deref())?,
            parent_task_id: self.parent_task_id,
        })
    }
}

/// Request to create a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub assigned_to: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub session_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub parent_task_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_date: Option<Timestamp>,
    pub tags: Option<BTreeSet<String>>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<Metadata>,
}

/// Partial task update. Status changes go through the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due_date: Option<Timestamp>,
    pub tags: Option<BTreeSet<String>>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<Metadata>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub parent_task_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusRequest {
    /// pending | assigned | running | completed | failed | cancelled
    pub status: Option<String>,
}

/// Result of `DELETE /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub deleted: bool,
}
