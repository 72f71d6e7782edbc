//! Enum types for iT-Agent entities

use serde::{Deserialize, Serialize};

use crate::impl_str_enum;

// ============================================================================
// TASK ENUMS
// ============================================================================

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Assigned,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl_str_enum!(TaskStatus, "task status", {
    Pending => "pending",
    Assigned => "assigned",
    Running => "running",
    Completed => "completed",
    Failed => "failed",
    Cancelled => "cancelled",
});

impl TaskStatus {
    /// Terminal statuses stamp `endedAt` when entered.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// Task priority. Variant order is significant: `Low < Medium < High < Urgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl_str_enum!(TaskPriority, "task priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

/// Category of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Manual,
    Auto,
    Development,
    Design,
    Testing,
    Planning,
    Research,
    Review,
    Other,
}

impl_str_enum!(TaskType, "task type", {
    Manual => "manual",
    Auto => "auto",
    Development => "development",
    Design => "design",
    Testing => "testing",
    Planning => "planning",
    Research => "research",
    Review => "review",
    Other => "other",
});

// ============================================================================
// SESSION ENUMS
// ============================================================================

/// Status of a collaboration session. Sessions are archived by status, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Planning,
    Active,
    Paused,
    Completed,
    Failed,
}

impl_str_enum!(SessionStatus, "session status", {
    Planning => "planning",
    Active => "active",
    Paused => "paused",
    Completed => "completed",
    Failed => "failed",
});

/// How agents in a session take turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStrategy {
    #[default]
    Sequential,
    Orchestrated,
    Parallel,
    Adaptive,
}

impl_str_enum!(CollaborationStrategy, "collaboration strategy", {
    Sequential => "sequential",
    Orchestrated => "orchestrated",
    Parallel => "parallel",
    Adaptive => "adaptive",
});

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    User,
    Agent,
}

impl_str_enum!(SenderType, "sender type", {
    User => "user",
    Agent => "agent",
});

/// Kind of content carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Code,
    Image,
    File,
    System,
    Error,
    Result,
}

impl_str_enum!(MessageType, "message type", {
    Text => "text",
    Code => "code",
    Image => "image",
    File => "file",
    System => "system",
    Error => "error",
    Result => "result",
});

// ============================================================================
// TOOL ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Ai,
    Development,
    Productivity,
    Communication,
    Analysis,
    System,
    #[default]
    Custom,
}

impl_str_enum!(ToolCategory, "tool category", {
    Ai => "ai",
    Development => "development",
    Productivity => "productivity",
    Communication => "communication",
    Analysis => "analysis",
    System => "system",
    Custom => "custom",
});

/// JSON type accepted by a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ToolParamType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl_str_enum!(ToolParamType, "tool parameter type", {
    String => "string",
    Number => "number",
    Boolean => "boolean",
    Array => "array",
    Object => "object",
});

/// Outcome recorded in a tool log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ToolLogStatus {
    Success,
    Error,
}

impl_str_enum!(ToolLogStatus, "tool log status", {
    Success => "success",
    Error => "error",
});

// ============================================================================
// TEAM ENUMS
// ============================================================================

/// How a team collaborates once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TeamType {
    Workflow,
    Conversation,
    Parallel,
}

impl_str_enum!(TeamType, "team type", {
    Workflow => "workflow",
    Conversation => "conversation",
    Parallel => "parallel",
});

impl TeamType {
    /// Minimum number of members required before the team can start.
    pub fn min_members(&self) -> usize {
        match self {
            TeamType::Workflow => 1,
            TeamType::Conversation => 2,
            TeamType::Parallel => 1,
        }
    }

    /// Session strategy a started team runs with.
    pub fn session_strategy(&self) -> CollaborationStrategy {
        match self {
            TeamType::Workflow => CollaborationStrategy::Sequential,
            TeamType::Conversation => CollaborationStrategy::Orchestrated,
            TeamType::Parallel => CollaborationStrategy::Parallel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    Active,
    #[default]
    Inactive,
    Archived,
}

impl_str_enum!(TeamStatus, "team status", {
    Active => "active",
    Inactive => "inactive",
    Archived => "archived",
});

/// Role a member plays inside a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Leader,
    Member,
    Observer,
    Specialist,
}

impl_str_enum!(MemberRole, "member role", {
    Leader => "leader",
    Member => "member",
    Observer => "observer",
    Specialist => "specialist",
});

// ============================================================================
// CATALOG ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CapabilityType {
    Tool,
    Knowledge,
    Reasoning,
    Communication,
    Custom,
}

impl_str_enum!(CapabilityType, "capability type", {
    Tool => "tool",
    Knowledge => "knowledge",
    Reasoning => "reasoning",
    Communication => "communication",
    Custom => "custom",
});

impl CapabilityType {
    /// Capability types suggested for an agent role.
    ///
    /// Unknown roles get the general-purpose set.
    pub fn recommended_for_role(role: &str) -> &'static [CapabilityType] {
        match role.trim().to_lowercase().as_str() {
            "assistant" => &[
                CapabilityType::Knowledge,
                CapabilityType::Reasoning,
                CapabilityType::Communication,
                CapabilityType::Tool,
            ],
            "expert" => &[CapabilityType::Knowledge, CapabilityType::Reasoning],
            "tool_user" => &[CapabilityType::Tool],
            "coordinator" => &[CapabilityType::Communication, CapabilityType::Reasoning],
            _ => &[CapabilityType::Knowledge, CapabilityType::Communication],
        }
    }
}

/// Grouping shown in the template gallery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    #[default]
    General,
    Development,
    Creative,
    Analysis,
    Education,
    Business,
    CustomerService,
    Custom,
}

impl_str_enum!(TemplateCategory, "template category", {
    General => "general",
    Development => "development",
    Creative => "creative",
    Analysis => "analysis",
    Education => "education",
    Business => "business",
    CustomerService => "customer_service",
    Custom => "custom",
});

// ============================================================================
// AGENT CONFIG ENUMS
// ============================================================================

/// Role an agent configuration plays in a collaboration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    User,
    Assistant,
    Orchestrator,
    Executor,
    Planner,
    Critic,
    Researcher,
    Coder,
    Tester,
    Reviewer,
    Custom,
}

impl_str_enum!(AgentRole, "agent role", {
    User => "user",
    Assistant => "assistant",
    Orchestrator => "orchestrator",
    Executor => "executor",
    Planner => "planner",
    Critic => "critic",
    Researcher => "researcher",
    Coder => "coder",
    Tester => "tester",
    Reviewer => "reviewer",
    Custom => "custom",
});

impl AgentRole {
    /// Hex color a new configuration with this role starts with.
    pub fn default_color(&self) -> &'static str {
        match self {
            AgentRole::User => "#4f46e5",
            AgentRole::Assistant => "#16a34a",
            AgentRole::Orchestrator => "#8b5cf6",
            AgentRole::Executor => "#0891b2",
            AgentRole::Planner | AgentRole::Custom => "#6366f1",
            AgentRole::Critic => "#dc2626",
            AgentRole::Researcher => "#eab308",
            AgentRole::Coder => "#2563eb",
            AgentRole::Tester => "#ea580c",
            AgentRole::Reviewer => "#db2777",
        }
    }

    /// Starter system prompt for a configuration with this role.
    pub fn default_system_message(&self) -> &'static str {
        match self {
            AgentRole::User => "You act for the user: take their instructions and work with the other agents until the request is understood and carried out.",
            AgentRole::Assistant => "You are an assistant. Offer thorough support and advice drawn from your knowledge and skills.",
            AgentRole::Orchestrator => "You coordinate the other agents. Split the work, hand it out and keep execution on track.",
            AgentRole::Executor => "You carry out concrete actions. Complete each assigned task accurately and efficiently.",
            AgentRole::Planner => "You plan. Turn complex problems into structured, step-by-step solutions.",
            AgentRole::Critic => "You review the other agents' work and give constructive feedback that improves the result.",
            AgentRole::Researcher => "You gather and analyse information, finding the data and knowledge the problem needs.",
            AgentRole::Coder => "You write and review code, aiming for correct, efficient and maintainable implementations.",
            AgentRole::Tester => "You verify solutions. Look for defects and confirm the result meets its requirements.",
            AgentRole::Reviewer => "You review deliverables for correctness and consistency before they are accepted.",
            AgentRole::Custom => "You are a custom agent. Follow the instructions configured for you.",
        }
    }
}

/// File format for interaction exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl_str_enum!(ExportFormat, "export format", {
    Json => "json",
    Csv => "csv",
});

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}
