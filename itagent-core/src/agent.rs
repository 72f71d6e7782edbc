//! Agent configurations: the reusable persona a team member or session
//! participant points at.

use serde::{Deserialize, Serialize};

use crate::{AgentRole, EntityId, Metadata, Timestamp};

/// Model used when a configuration does not name one.
pub const DEFAULT_AGENT_MODEL: &str = "gpt-3.5-turbo";

/// Color used when a configuration does not name one.
pub const DEFAULT_AGENT_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
    pub role: AgentRole,
    #[serde(default)]
    pub description: String,
    pub system_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub color: String,
    pub model: String,
    /// Capability names, in the order they were given.
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub settings: Metadata,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl AgentConfig {
    /// A configuration with the default color and model.
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        role: AgentRole,
        system_message: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            description: String::new(),
            system_message: system_message.into(),
            icon: None,
            color: DEFAULT_AGENT_COLOR.to_string(),
            model: DEFAULT_AGENT_MODEL.to_string(),
            capabilities: Vec::new(),
            settings: Metadata::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy under a fresh id, named "`<name>` (copy)".
    pub fn duplicate(&self, id: EntityId, now: Timestamp) -> Self {
        Self {
            id,
            name: format!("{} (copy)", self.name),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;
    use chrono::{Duration, Utc};

    #[test]
    fn test_duplicate_keeps_settings_and_renames() {
        let then = Utc::now() - Duration::hours(2);
        let mut original = AgentConfig::new(new_entity_id(), "Critic", AgentRole::Critic, "Review", then);
        original.capabilities = vec!["search".to_string(), "summarize".to_string()];
        original.settings.insert("temperature".to_string(), serde_json::json!(0.2));

        let now = Utc::now();
        let copy = original.duplicate(new_entity_id(), now);
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Critic (copy)");
        assert_eq!(copy.capabilities, original.capabilities);
        assert_eq!(copy.settings, original.settings);
        assert_eq!(copy.created_at, now);
    }

    #[test]
    fn test_wire_form_is_camel_case() -> Result<(), serde_json::Error> {
        let config = AgentConfig::new(new_entity_id(), "Planner", AgentRole::Planner, "Plan", Utc::now());
        let json = serde_json::to_value(&config)?;
        assert_eq!(json["systemMessage"], "Plan");
        assert_eq!(json["role"], "planner");
        assert_eq!(json["model"], DEFAULT_AGENT_MODEL);
        assert!(json.get("icon").is_none());
        Ok(())
    }
}
