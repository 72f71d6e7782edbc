//! iT-Agent Core - Entity Types
//!
//! Data structures shared by every other crate: sessions, tasks, tools,
//! tool logs, teams, agent configurations and the template/capability
//! catalog. Behavior here is
//! limited to invariants that belong to a single entity (status timestamps,
//! rating aggregation, member ordering).

mod macros;

pub mod agent;
pub mod catalog;
pub mod enums;
pub mod error;
pub mod identity;
pub mod rating;
pub mod session;
pub mod task;
pub mod team;
pub mod tool;

pub use agent::{AgentConfig, DEFAULT_AGENT_COLOR, DEFAULT_AGENT_MODEL};
pub use catalog::{AgentTemplate, Capability, Rated};
pub use enums::{
    AgentRole, CapabilityType, CollaborationStrategy, ExportFormat, MemberRole, MessageType,
    SenderType, SessionStatus, TaskPriority, TaskStatus, TaskType, TeamStatus, TeamType,
    TemplateCategory, ToolCategory, ToolLogStatus, ToolParamType,
};
pub use error::{EnumParseError, ValidationError, ValidationResult};
pub use identity::{new_entity_id, slugify, DurationMs, EntityId, Metadata, Timestamp};
pub use rating::{validate_rating, RatingBook, RATING_RANGE};
pub use session::{Message, Session, SessionAgent};
pub use task::Task;
pub use team::{Team, TeamMember};
pub use tool::{Tool, ToolAction, ToolLog, ToolParameter};
