//! Tool descriptors and tool invocation logs

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::{DurationMs, EntityId, ToolCategory, ToolLogStatus, ToolParamType, Timestamp};

// ============================================================================
// TOOL DESCRIPTOR
// ============================================================================

/// One named parameter a tool accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ToolParamType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
}

impl ToolParameter {
    pub fn required(name: &str, param_type: ToolParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
            default_value: None,
        }
    }

    pub fn optional(
        name: &str,
        param_type: ToolParamType,
        description: &str,
        default_value: Option<JsonValue>,
    ) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: false,
            default_value,
        }
    }
}

/// Static capability descriptor for a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Stable slug, e.g. `data-parse-json`.
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_builtin: bool,
    pub enabled: bool,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// An action a client can perform against a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ToolAction {
    pub name: String,
    pub description: String,
}

impl ToolAction {
    fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

impl Tool {
    /// JSON Schema (draft 2020-12) describing the accepted parameter object.
    pub fn input_schema(&self) -> JsonValue {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(param.param_type.as_str()));
            if !param.description.is_empty() {
                prop.insert("description".to_string(), json!(param.description));
            }
            properties.insert(param.name.clone(), JsonValue::Object(prop));
            if param.required {
                required.push(JsonValue::String(param.name.clone()));
            }
        }
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Fill in declared defaults for parameters the caller left out.
    pub fn apply_defaults(&self, params: &JsonValue) -> JsonValue {
        let mut merged = match params {
            JsonValue::Object(map) => map.clone(),
            _ => Map::new(),
        };
        for param in &self.parameters {
            if let Some(default) = &param.default_value {
                merged
                    .entry(param.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
        JsonValue::Object(merged)
    }

    /// Actions available on this tool: `query` for every tool, then
    /// category-specific actions.
    pub fn actions(&self) -> Vec<ToolAction> {
        let mut actions = vec![
            ToolAction::new("query", "Query tool information and parameters"),
            ToolAction::new("invoke", "Invoke the tool with parameters"),
        ];
        let extra: &[(&str, &str)] = match self.category {
            ToolCategory::Analysis => &[
                ("analyze", "Analyze structured input"),
                ("transform", "Transform data between formats"),
            ],
            ToolCategory::Development => &[
                ("run", "Run against a development target"),
                ("inspect", "Inspect the development target"),
            ],
            ToolCategory::Communication => &[("send", "Send a message through the tool")],
            ToolCategory::System => &[("status", "Report system status")],
            ToolCategory::Ai => &[("generate", "Generate content")],
            ToolCategory::Productivity => &[("schedule", "Schedule work items")],
            ToolCategory::Custom => &[],
        };
        actions.extend(extra.iter().map(|(n, d)| ToolAction::new(n, d)));
        actions
    }
}

// ============================================================================
// TOOL LOG
// ============================================================================

/// Append-only record of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ToolLog {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub tool_id: String,
    pub session_id: String,
    pub agent_id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub params: JsonValue,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: ToolLogStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub start_time: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub end_time: Timestamp,
    pub execution_time_ms: DurationMs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_tool() -> Tool {
        let now = Utc::now();
        Tool {
            id: "data-format-date".to_string(),
            name: "Format date".to_string(),
            description: "Format a date".to_string(),
            category: ToolCategory::Analysis,
            tags: vec![],
            is_builtin: true,
            enabled: true,
            parameters: vec![
                ToolParameter::required("date", ToolParamType::String, "Date to format"),
                ToolParameter::optional(
                    "format",
                    ToolParamType::String,
                    "Pattern",
                    Some(json!("YYYY-MM-DD")),
                ),
            ],
            return_type: None,
            examples: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_input_schema_lists_required_parameters() {
        let schema = sample_tool().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["date"]));
        assert_eq!(schema["properties"]["format"]["type"], "string");
    }

    #[test]
    fn test_apply_defaults_keeps_caller_values() {
        let tool = sample_tool();
        let merged = tool.apply_defaults(&json!({"date": "2024-01-01"}));
        assert_eq!(merged["format"], "YYYY-MM-DD");

        let merged = tool.apply_defaults(&json!({"date": "2024-01-01", "format": "DD"}));
        assert_eq!(merged["format"], "DD");
    }

    #[test]
    fn test_actions_start_with_query() {
        let actions = sample_tool().actions();
        assert_eq!(actions[0].name, "query");
        assert!(actions.iter().any(|a| a.name == "transform"));
    }
}
