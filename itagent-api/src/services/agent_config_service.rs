//! Agent Config Service
//!
//! Reusable agent personas. Team members and session participants refer to
//! them by id through `configId`.

use chrono::Utc;
use itagent_core::{new_entity_id, AgentConfig, AgentRole, EntityId};
use itagent_storage::InMemoryRepository;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{
    AgentConfigListQuery, AgentRoleTemplate, CreateAgentConfigRequest, DeletedResponse,
    UpdateAgentConfigRequest,
};
use crate::validation::{parse_optional, ValidateNonEmpty};

#[derive(Debug, Clone, Default)]
pub struct AgentConfigService {
    configs: InMemoryRepository<AgentConfig>,
}

fn config_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::AgentConfigNotFound)
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AgentConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurations, most recently updated first.
    pub fn list_configs(&self, query: &AgentConfigListQuery) -> ApiResult<Vec<AgentConfig>> {
        let role = parse_optional::<AgentRole>(query.role.as_deref())?;
        let mut configs = self.configs.find(|c| role.map_or(true, |r| c.role == r))?;
        configs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(configs)
    }

    pub fn get_config(&self, id: EntityId) -> ApiResult<AgentConfig> {
        self.configs.get(&id)?.ok_or_else(config_not_found)
    }

    pub fn create_config(&self, req: CreateAgentConfigRequest) -> ApiResult<AgentConfig> {
        let name = req.name.validate_non_empty("name")?;
        let role: AgentRole = req.role.validate_non_empty("role")?.parse()?;
        let system_message = req.system_message.validate_non_empty("systemMessage")?;

        let mut config = AgentConfig::new(new_entity_id(), name, role, system_message, Utc::now());
        config.description = req.description.unwrap_or_default();
        config.icon = non_blank(req.icon);
        config.color = non_blank(req.color).unwrap_or_else(|| role.default_color().to_string());
        if let Some(model) = non_blank(req.model) {
            config.model = model;
        }
        config.capabilities = req.capabilities.unwrap_or_default();
        config.settings = req.settings.unwrap_or_default();

        self.configs.insert(config.clone())?;
        tracing::info!(config_id = %config.id, role = %role, "agent config created");
        Ok(config)
    }

    pub fn update_config(
        &self,
        id: EntityId,
        req: UpdateAgentConfigRequest,
    ) -> ApiResult<AgentConfig> {
        let name = req.name.as_ref().map(|n| n.validate_non_empty("name")).transpose()?;
        let role = parse_optional::<AgentRole>(req.role.as_deref())?;
        let system_message = req
            .system_message
            .as_ref()
            .map(|m| m.validate_non_empty("systemMessage"))
            .transpose()?;

        self.configs
            .update(&id, |config| {
                if let Some(name) = name {
                    config.name = name;
                }
                if let Some(role) = role {
                    config.role = role;
                }
                if let Some(description) = req.description {
                    config.description = description;
                }
                if let Some(system_message) = system_message {
                    config.system_message = system_message;
                }
                if let Some(icon) = req.icon {
                    config.icon = non_blank(Some(icon));
                }
                if let Some(color) = non_blank(req.color) {
                    config.color = color;
                }
                if let Some(model) = non_blank(req.model) {
                    config.model = model;
                }
                if let Some(capabilities) = req.capabilities {
                    config.capabilities = capabilities;
                }
                if let Some(settings) = req.settings {
                    config.settings = settings;
                }
                config.updated_at = Utc::now();
                Ok::<_, ApiError>(config.clone())
            })?
            .ok_or_else(config_not_found)
    }

    pub fn delete_config(&self, id: EntityId) -> ApiResult<DeletedResponse> {
        self.configs.remove(&id)?.ok_or_else(config_not_found)?;
        tracing::info!(config_id = %id, "agent config deleted");
        Ok(DeletedResponse { id, deleted: true })
    }

    /// Store a copy of `id` under a new id.
    pub fn clone_config(&self, id: EntityId) -> ApiResult<AgentConfig> {
        let source = self.get_config(id)?;
        let copy = source.duplicate(new_entity_id(), Utc::now());
        self.configs.insert(copy.clone())?;
        tracing::info!(source_id = %id, config_id = %copy.id, "agent config cloned");
        Ok(copy)
    }

    /// Starter color and system message for `role`.
    pub fn role_template(&self, role: &str) -> ApiResult<AgentRoleTemplate> {
        let role: AgentRole = role.validate_non_empty("role")?.parse()?;
        Ok(AgentRoleTemplate::from(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(service: &AgentConfigService, name: &str, role: &str) -> ApiResult<AgentConfig> {
        service.create_config(CreateAgentConfigRequest {
            name: Some(name.to_string()),
            role: Some(role.to_string()),
            system_message: Some(format!("You are {}", name)),
            ..Default::default()
        })
    }

    #[test]
    fn test_create_requires_name_role_and_message() {
        let service = AgentConfigService::new();
        let err = service
            .create_config(CreateAgentConfigRequest {
                name: Some("Critic".to_string()),
                role: Some("critic".to_string()),
                ..Default::default()
            })
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::MissingField));

        let err = create(&service, "Wizard", "wizard").err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ValidationFailed));
    }

    #[test]
    fn test_create_fills_role_defaults() -> ApiResult<()> {
        let service = AgentConfigService::new();
        let config = create(&service, "Critic", "CRITIC")?;
        assert_eq!(config.role, AgentRole::Critic);
        assert_eq!(config.color, AgentRole::Critic.default_color());
        assert_eq!(config.model, itagent_core::DEFAULT_AGENT_MODEL);
        assert!(config.capabilities.is_empty());
        Ok(())
    }

    #[test]
    fn test_list_filters_by_role_newest_first() -> ApiResult<()> {
        let service = AgentConfigService::new();
        let first = create(&service, "Coder A", "coder")?;
        create(&service, "Tester", "tester")?;
        let second = create(&service, "Coder B", "coder")?;
        service.update_config(
            first.id,
            UpdateAgentConfigRequest {
                description: Some("touched".to_string()),
                ..Default::default()
            },
        )?;

        let coders = service.list_configs(&AgentConfigListQuery {
            role: Some("coder".to_string()),
        })?;
        let ids: Vec<_> = coders.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(service
            .list_configs(&AgentConfigListQuery {
                role: Some("bard".to_string()),
            })
            .is_err());
        Ok(())
    }

    #[test]
    fn test_update_rejects_blank_name_and_keeps_config() -> ApiResult<()> {
        let service = AgentConfigService::new();
        let config = create(&service, "Planner", "planner")?;
        let err = service
            .update_config(
                config.id,
                UpdateAgentConfigRequest {
                    name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::MissingField));
        assert_eq!(service.get_config(config.id)?.name, "Planner");

        let err = service
            .update_config(new_entity_id(), UpdateAgentConfigRequest::default())
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::AgentConfigNotFound));
        Ok(())
    }

    #[test]
    fn test_clone_and_delete() -> ApiResult<()> {
        let service = AgentConfigService::new();
        let config = create(&service, "Researcher", "researcher")?;
        let copy = service.clone_config(config.id)?;
        assert_eq!(copy.name, "Researcher (copy)");
        assert_eq!(copy.system_message, config.system_message);
        assert_eq!(service.list_configs(&AgentConfigListQuery::default())?.len(), 2);

        assert!(service.delete_config(config.id)?.deleted);
        assert!(service.get_config(config.id).is_err());
        assert!(service.get_config(copy.id).is_ok());
        let err = service.clone_config(config.id).err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::AgentConfigNotFound));
        Ok(())
    }

    #[test]
    fn test_role_template() -> ApiResult<()> {
        let service = AgentConfigService::new();
        let template = service.role_template("tester")?;
        assert_eq!(template.role, AgentRole::Tester);
        assert_eq!(template.color, "#ea580c");
        assert!(service.role_template("oracle").is_err());
        Ok(())
    }
}
