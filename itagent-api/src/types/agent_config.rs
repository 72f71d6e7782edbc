//! Agent configuration API types

use itagent_core::{AgentRole, Metadata};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfigListQuery {
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentConfigRequest {
    pub name: Option<String>,
    /// user | assistant | orchestrator | executor | planner | critic |
    /// researcher | coder | tester | reviewer | custom
    pub role: Option<String>,
    pub description: Option<String>,
    pub system_message: Option<String>,
    pub icon: Option<String>,
    /// Defaults to the role's color.
    pub color: Option<String>,
    pub model: Option<String>,
    pub capabilities: Option<Vec<String>>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub settings: Option<Metadata>,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentConfigRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub system_message: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub model: Option<String>,
    pub capabilities: Option<Vec<String>>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub settings: Option<Metadata>,
}

/// Starter values for a new configuration with a given role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentRoleTemplate {
    pub role: AgentRole,
    pub color: String,
    pub system_message: String,
}

impl From<AgentRole> for AgentRoleTemplate {
    fn from(role: AgentRole) -> Self {
        Self {
            role,
            color: role.default_color().to_string(),
            system_message: role.default_system_message().to_string(),
        }
    }
}
