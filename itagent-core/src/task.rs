//! Task entity and its status rules

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{EntityId, Metadata, TaskPriority, TaskStatus, TaskType, Timestamp};

/// A unit of work, optionally nested under a parent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Agent reference the task is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<EntityId>,
    /// Direct children, ordered by creation. Only populated on single-task reads.
    #[cfg_attr(feature = "openapi", schema(no_recursion))]
    #[serde(default)]
    pub sub_tasks: Vec<Task>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub metadata: Metadata,
}

impl Task {
    /// A fresh pending task with default priority and type.
    pub fn new(id: EntityId, name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::default(),
            task_type: TaskType::default(),
            assigned_to: None,
            session_id: None,
            parent_task_id: None,
            sub_tasks: Vec::new(),
            created_at: now,
            updated_at: now,
            due_date: None,
            started_at: None,
            ended_at: None,
            completed_at: None,
            tags: BTreeSet::new(),
            metadata: Metadata::new(),
        }
    }

    /// Move the task to `status`, maintaining the lifecycle timestamps.
    ///
    /// `completed_at` is present exactly while the status is `Completed`.
    pub fn apply_status(&mut self, status: TaskStatus, now: Timestamp) {
        if status == TaskStatus::Running && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if status.is_terminal() {
            self.ended_at = Some(now);
        }
        self.completed_at = match status {
            TaskStatus::Completed if self.status == TaskStatus::Completed => self.completed_at,
            TaskStatus::Completed => Some(now),
            _ => None,
        };
        self.status = status;
        self.updated_at = now;
    }

    /// Assign the task, advancing `Pending` to `Assigned`. Other statuses are kept.
    pub fn assign(&mut self, agent_id: impl Into<String>, now: Timestamp) {
        self.assigned_to = Some(agent_id.into());
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::Assigned;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;
    use chrono::{Duration, Utc};

    #[test]
    fn test_completed_at_tracks_completed_status() {
        let t0 = Utc::now();
        let mut task = Task::new(new_entity_id(), "write docs", t0);

        task.apply_status(TaskStatus::Running, t0 + Duration::seconds(1));
        assert_eq!(task.started_at, Some(t0 + Duration::seconds(1)));
        assert!(task.completed_at.is_none());

        let done = t0 + Duration::seconds(5);
        task.apply_status(TaskStatus::Completed, done);
        assert_eq!(task.completed_at, Some(done));
        assert_eq!(task.ended_at, Some(done));

        // Re-applying completed keeps the original stamp.
        task.apply_status(TaskStatus::Completed, done + Duration::seconds(9));
        assert_eq!(task.completed_at, Some(done));

        task.apply_status(TaskStatus::Running, done + Duration::seconds(10));
        assert!(task.completed_at.is_none());
        assert_eq!(task.started_at, Some(t0 + Duration::seconds(1)));
    }

    #[test]
    fn test_failed_sets_ended_but_not_completed() {
        let now = Utc::now();
        let mut task = Task::new(new_entity_id(), "deploy", now);
        task.apply_status(TaskStatus::Failed, now);
        assert_eq!(task.ended_at, Some(now));
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_assign_only_advances_pending() {
        let now = Utc::now();
        let mut task = Task::new(new_entity_id(), "review", now);
        task.assign("agent-1", now);
        assert_eq!(task.status, TaskStatus::Assigned);

        task.apply_status(TaskStatus::Running, now);
        task.assign("agent-2", now);
        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.assigned_to.as_deref(), Some("agent-2"));
    }

    #[test]
    fn test_task_serializes_camel_case() -> Result<(), serde_json::Error> {
        let task = Task::new(new_entity_id(), "t", Utc::now());
        let value = serde_json::to_value(&task)?;
        assert_eq!(value["type"], "manual");
        assert_eq!(value["priority"], "medium");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("completedAt").is_none());
        Ok(())
    }
}
