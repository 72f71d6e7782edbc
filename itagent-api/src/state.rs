//! Shared application state for Axum routers.

use std::sync::Arc;

use chrono::Utc;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::services::builtin_tools::builtin_tools;
use crate::services::permission::{RulePolicy, ToolPermissionPolicy};
use crate::services::{
    AgentConfigService, CapabilityService, InteractionService, SessionService, TaskService, TeamService,
    TemplateService, ToolLogService, ToolService,
};

/// Application-wide state shared across all routes.
///
/// Every service is built once here. Services that read each other's data
/// share the same underlying repositories: teams and interactions see the
/// session store, and tool calls write into the tool-log store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub sessions: Arc<SessionService>,
    pub tasks: Arc<TaskService>,
    pub tools: Arc<ToolService>,
    pub tool_logs: Arc<ToolLogService>,
    pub teams: Arc<TeamService>,
    pub templates: Arc<TemplateService>,
    pub agent_configs: Arc<AgentConfigService>,
    pub capabilities: Arc<CapabilityService>,
    pub interactions: Arc<InteractionService>,
    pub start_time: std::time::Instant,
}

crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(Arc<SessionService>, sessions);
crate::impl_from_ref!(Arc<TaskService>, tasks);
crate::impl_from_ref!(Arc<ToolService>, tools);
crate::impl_from_ref!(Arc<ToolLogService>, tool_logs);
crate::impl_from_ref!(Arc<TeamService>, teams);
crate::impl_from_ref!(Arc<TemplateService>, templates);
crate::impl_from_ref!(Arc<AgentConfigService>, agent_configs);
crate::impl_from_ref!(Arc<CapabilityService>, capabilities);
crate::impl_from_ref!(Arc<InteractionService>, interactions);
crate::impl_from_ref!(std::time::Instant, start_time);

impl AppState {
    /// Build every service from `config`, seeding the default catalogs.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let policy: Arc<dyn ToolPermissionPolicy> = Arc::new(RulePolicy::new(
            config.tool_permission_rules.clone(),
            config.tool_permission_fallback,
        ));
        Self::with_policy(config, policy)
    }

    /// Like [`AppState::new`] but with an explicit tool permission policy.
    pub fn with_policy(config: ApiConfig, policy: Arc<dyn ToolPermissionPolicy>) -> ApiResult<Self> {
        let sessions = SessionService::new();
        let tool_logs = ToolLogService::new(config.recent_logs_default);
        let tools = ToolService::new(policy, tool_logs.clone())?;

        let state = Self {
            tasks: Arc::new(TaskService::new()),
            tools: Arc::new(tools),
            tool_logs: Arc::new(tool_logs),
            teams: Arc::new(TeamService::new(sessions.clone())),
            templates: Arc::new(TemplateService::new()?),
            agent_configs: Arc::new(AgentConfigService::new()),
            capabilities: Arc::new(CapabilityService::new(&builtin_tools(Utc::now()))?),
            interactions: Arc::new(InteractionService::new(sessions.clone())),
            sessions: Arc::new(sessions),
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        };
        tracing::info!("application state initialized");
        Ok(state)
    }
}
