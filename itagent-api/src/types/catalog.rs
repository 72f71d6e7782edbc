//! Template and capability API types

use itagent_core::{AgentTemplate, Capability, EntityId, TemplateCategory};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Size of the popular, recommended and top-rated template lists.
pub const DEFAULT_TEMPLATE_HIGHLIGHTS: usize = 5;

// ============================================================================
// TEMPLATES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListQuery {
    pub role: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive match on name, description or tags.
    pub search: Option<String>,

    // The first mode flag set to `true` wins, in field order.
    pub popular: Option<bool>,
    pub recommended: Option<bool>,
    pub rated: Option<bool>,
    pub categories: Option<bool>,
    pub by_category: Option<bool>,
    /// Highlight list size, default [`DEFAULT_TEMPLATE_HIGHLIGHTS`].
    pub limit: Option<usize>,
}

/// Body of `GET /agents/templates`, shaped by the mode flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateListing {
    Templates(Vec<AgentTemplate>),
    Categories(Vec<TemplateCategory>),
    ByCategory(BTreeMap<TemplateCategory, Vec<AgentTemplate>>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub config: Option<JsonValue>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub category: Option<String>,

    /// Clone the template `configId` under `templateName`.
    pub from_config: Option<bool>,
    pub config_id: Option<String>,
    pub template_name: Option<String>,
    pub author_id: Option<String>,

    /// A template as produced by the export endpoint, either the JSON text
    /// or the object itself.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub import_data: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub config: Option<JsonValue>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub category: Option<String>,
    pub is_featured: Option<bool>,
    pub recommendation_order: Option<u32>,
}

/// Fields read from imported template JSON. Everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateImport {
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub role: Option<String>,
    #[serde(default)]
    pub config: JsonValue,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: TemplateCategory,
    pub is_public: Option<bool>,
}

/// Rating body shared by templates and capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    /// Number in 1..=5; fractions such as 3.5 are allowed.
    pub rating: Option<f64>,
    /// Required on `POST /agents/templates/rate` only.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub template_id: Option<EntityId>,
    pub user_id: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TemplateRatingResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub template_id: EntityId,
    pub rating: f64,
    pub rating_count: u64,
}

// ============================================================================
// CAPABILITIES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityListQuery {
    #[serde(rename = "type")]
    pub capability_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateCapabilityRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// tool | knowledge | reasoning | communication | custom
    #[serde(rename = "type")]
    pub capability_type: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub parameters: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRatingResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub capability_id: EntityId,
    pub rating: f64,
    pub rating_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendQuery {
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecommendResponse {
    pub role: String,
    pub capabilities: Vec<Capability>,
}
