//! OpenAPI Specification for the iT-Agent API
//!
//! Generated by utoipa from the route annotations and the schema derives on
//! the request, response and entity types.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ErrorCode, ErrorEnvelope};
use crate::routes::health::{HealthReport, HealthStatus, StoreCounts};
use crate::types::*;

use crate::routes::{agent_config, capability, health, interaction, session, task, team, template, tool, tool_log};

use itagent_core::{
    AgentConfig, AgentRole, AgentTemplate, Capability, CapabilityType, CollaborationStrategy,
    ExportFormat, MemberRole, Message, MessageType, SenderType, Session, SessionAgent,
    SessionStatus, Task, TaskPriority, TaskStatus, TaskType, Team, TeamMember, TeamStatus,
    TeamType, TemplateCategory, Tool, ToolAction, ToolCategory, ToolLog, ToolLogStatus,
    ToolParamType, ToolParameter,
};

/// OpenAPI document for the iT-Agent API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "iT-Agent API",
        version = "0.1.0",
        description = "Multi-agent collaboration backend: sessions, tasks, tools, teams and the agent catalog",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Sessions", description = "Collaboration sessions, participants and messages"),
        (name = "Tasks", description = "Task tracking with parent/child hierarchy"),
        (name = "Tools", description = "Tool catalog and invocation"),
        (name = "Tool Logs", description = "Tool invocation history"),
        (name = "Teams", description = "Agent teams owned by a user"),
        (name = "Templates", description = "Agent templates, ratings, gallery views and export"),
        (name = "Agent Configs", description = "Reusable agent configurations"),
        (name = "Capabilities", description = "Agent capability catalog and recommendations"),
        (name = "Interactions", description = "Per-agent message history, statistics and export"),
        (name = "Health", description = "Liveness and readiness checks")
    ),
    paths(
        // === Session Routes ===
        session::list_sessions,
        session::create_session,
        session::get_session,
        session::update_session,
        session::list_agents,
        session::add_agent,
        session::list_messages,
        session::add_message,
        session::list_session_tasks,
        session::create_session_task,

        // === Task Routes ===
        task::list_tasks,
        task::create_task,
        task::get_task,
        task::update_task,
        task::delete_task,
        task::assign_task,
        task::update_task_status,

        // === Tool Routes ===
        tool::list_tools,
        tool::register_tool,
        tool::get_tool,
        tool::list_actions,
        tool::list_executions,
        tool::call_tool,
        tool::execute_tool,

        // === Tool Log Routes ===
        tool_log::query_logs,
        tool_log::clear_old_logs,
        tool_log::get_log,

        // === Team Routes ===
        team::list_teams,
        team::create_team,
        team::get_team,
        team::update_team,
        team::delete_team,
        team::add_member,
        team::update_member,
        team::remove_member,
        team::start_team,

        // === Template Routes ===
        template::list_templates,
        template::create_template,
        template::get_template,
        template::update_template,
        template::delete_template,
        template::rate_template,
        template::rate_template_by_id,
        template::export_template,

        // === Agent Config Routes ===
        agent_config::list_configs,
        agent_config::create_config,
        agent_config::role_template,
        agent_config::get_config,
        agent_config::update_config,
        agent_config::delete_config,
        agent_config::clone_config,

        // === Capability Routes ===
        capability::list_capabilities,
        capability::create_capability,
        capability::recommend_capabilities,
        capability::get_capability,
        capability::rate_capability,

        // === Interaction Routes ===
        interaction::list_interactions,
        interaction::interaction_stats,
        interaction::export_interactions,
        interaction::get_interaction,

        // === Health ===
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            // Errors
            ErrorEnvelope, ErrorCode,

            // Entities
            Session, SessionAgent, Message, Task, Tool, ToolParameter, ToolAction, ToolLog,
            Team, TeamMember, AgentTemplate, AgentConfig, Capability,

            // Enums
            SessionStatus, CollaborationStrategy, SenderType, MessageType, TaskStatus,
            TaskPriority, TaskType, ToolCategory, ToolParamType, ToolLogStatus, TeamType,
            TeamStatus, MemberRole, CapabilityType, ExportFormat, TemplateCategory, AgentRole,

            // Requests and responses
            CreateSessionRequest, UpdateSessionRequest, AddSessionAgentRequest,
            AddMessageRequest, CreateTaskRequest, UpdateTaskRequest, AssignTaskRequest,
            UpdateTaskStatusRequest, DeletedResponse, ToolListResponse, RegisterToolRequest,
            CallToolRequest, CallToolResponse, ExecuteToolRequest, ExecuteToolResult,
            ExecuteToolResponse, ToolExecutionsPage, ClearLogsResponse, CreateTeamRequest,
            UpdateTeamRequest, AddTeamMemberRequest, UpdateTeamMemberRequest,
            TeamMemberResponse, StartTeamRequest, StartTeamResponse, CreateTemplateRequest,
            UpdateTemplateRequest, RateRequest, TemplateRatingResponse,
            CreateCapabilityRequest, CapabilityRatingResponse, RecommendResponse,
            InteractionListResponse, InteractionStats, CreateAgentConfigRequest,
            UpdateAgentConfigRequest, AgentRoleTemplate,

            // Health
            HealthReport, HealthStatus, StoreCounts,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer scheme referenced by `security(("bearer_auth" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Render the OpenAPI document as pretty JSON.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "iT-Agent API");

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("Session"));
        assert!(components.schemas.contains_key("AgentConfig"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let paths = ApiDoc::openapi().paths.paths;
        for path in [
            "/api/v1/sessions",
            "/api/v1/sessions/{id}/messages",
            "/api/v1/tasks/{id}/status",
            "/api/v1/tools/call",
            "/api/v1/tool-logs",
            "/api/v1/agents/teams/{id}/start",
            "/api/v1/agents/templates/rate",
            "/api/v1/agents/templates/{id}/export",
            "/api/v1/agents/config",
            "/api/v1/agents/config/{id}/clone",
            "/api/v1/agents/config/roles/{role}",
            "/api/v1/agents/capabilities/recommend",
            "/api/v1/agents/{id}/interactions/export",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| e.to_string())?;
        serde_json::from_str::<serde_json::Value>(&json).map_err(|e| e.to_string())?;
        assert!(json.contains("\"bearer_auth\""));
        Ok(())
    }
}
