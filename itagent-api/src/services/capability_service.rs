//! Capability Service
//!
//! Capability catalog, ratings and role-based recommendations. The catalog
//! starts with the general reasoning, knowledge and communication
//! capabilities plus one tool capability per seeded tool.

use chrono::Utc;
use itagent_core::{
    new_entity_id, validate_rating, Capability, CapabilityType, EntityId, Rated, RatingBook, Tool,
};
use itagent_storage::InMemoryRepository;
use serde_json::{json, Value as JsonValue};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{CapabilityRatingResponse, CreateCapabilityRequest, RecommendResponse};
use crate::validation::{parse_optional, ValidateNonEmpty};

#[derive(Debug, Clone)]
pub struct CapabilityService {
    capabilities: InMemoryRepository<Capability>,
}

fn capability_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::CapabilityNotFound)
}

fn capability(
    name: &str,
    description: &str,
    capability_type: CapabilityType,
    parameters: JsonValue,
) -> Capability {
    let now = Utc::now();
    Capability {
        id: new_entity_id(),
        name: name.to_string(),
        description: description.to_string(),
        capability_type,
        parameters,
        rating: 0.0,
        rating_count: 0,
        ratings: RatingBook::default(),
        created_at: now,
        updated_at: now,
    }
}

fn default_capabilities(tools: &[Tool]) -> Vec<Capability> {
    let mut catalog = vec![
        capability(
            "General reasoning",
            "Logical reasoning and problem solving",
            CapabilityType::Reasoning,
            json!({"tags": ["reasoning", "logic", "problem-solving"]}),
        ),
        capability(
            "General knowledge",
            "Common knowledge and domain facts",
            CapabilityType::Knowledge,
            json!({"tags": ["knowledge", "facts", "information"]}),
        ),
        capability(
            "Agent messaging",
            "Exchange messages with other agents",
            CapabilityType::Communication,
            json!({"tags": ["communication", "messaging"]}),
        ),
    ];
    catalog.extend(tools.iter().map(|tool| {
        capability(
            &format!("{} tool", tool.name),
            &tool.description,
            CapabilityType::Tool,
            json!({"toolId": tool.id, "parameters": tool.parameters}),
        )
    }));
    catalog
}

impl CapabilityService {
    /// Service seeded with the default catalog; `tools` each get a tool capability.
    pub fn new(tools: &[Tool]) -> ApiResult<Self> {
        let capabilities = InMemoryRepository::new();
        for capability in default_capabilities(tools) {
            capabilities.insert(capability)?;
        }
        Ok(Self { capabilities })
    }

    /// Capabilities of the given type (all when `None`), by name.
    pub fn list_capabilities(&self, capability_type: Option<&str>) -> ApiResult<Vec<Capability>> {
        let wanted = parse_optional::<CapabilityType>(capability_type)?;
        let mut capabilities = self
            .capabilities
            .find(|c| wanted.map_or(true, |t| c.capability_type == t))?;
        capabilities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(capabilities)
    }

    pub fn create_capability(&self, req: CreateCapabilityRequest) -> ApiResult<Capability> {
        let name = req.name.validate_non_empty("name")?;
        let capability_type: CapabilityType = req.capability_type.validate_non_empty("type")?.parse()?;
        let capability = capability(
            &name,
            req.description.as_deref().unwrap_or_default(),
            capability_type,
            req.parameters.unwrap_or_else(|| json!({})),
        );
        self.capabilities.insert(capability.clone())?;
        tracing::info!(capability_id = %capability.id, "capability created");
        Ok(capability)
    }

    pub fn get_capability(&self, id: EntityId) -> ApiResult<Capability> {
        self.capabilities.get(&id)?.ok_or_else(capability_not_found)
    }

    pub fn rate_capability(
        &self,
        id: EntityId,
        rating: Option<f64>,
        user_id: Option<&str>,
    ) -> ApiResult<CapabilityRatingResponse> {
        let raw = rating.ok_or_else(|| ApiError::missing_field("rating"))?;
        let rating = validate_rating(raw)?;

        let (average, count) = self
            .capabilities
            .update(&id, |capability| {
                Ok::<_, ApiError>(capability.rate(user_id, rating, Utc::now()))
            })?
            .ok_or_else(capability_not_found)?;
        Ok(CapabilityRatingResponse {
            capability_id: id,
            rating: average,
            rating_count: count,
        })
    }

    /// Capabilities whose type is recommended for `role`.
    pub fn recommend(&self, role: Option<&str>) -> ApiResult<RecommendResponse> {
        let role = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ApiError::validation_failed("Missing role parameter"))?;
        let recommended = CapabilityType::recommended_for_role(role);
        let mut capabilities = self
            .capabilities
            .find(|c| recommended.contains(&c.capability_type))?;
        capabilities.sort_by(|a, b| {
            let rank = |c: &Capability| recommended.iter().position(|t| *t == c.capability_type);
            rank(a)
                .cmp(&rank(b))
                .then(b.rating.total_cmp(&a.rating))
                .then(a.name.cmp(&b.name))
        });
        Ok(RecommendResponse {
            role: role.to_string(),
            capabilities,
        })
    }
}
