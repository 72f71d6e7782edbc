//! Tool-related API types

use itagent_core::{EntityId, Timestamp, Tool, ToolCategory, ToolLog, ToolParameter};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ApiResult;
use crate::validation::parse_optional;

/// Raw `GET /tools` query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub enabled: Option<bool>,
    pub limit: Option<usize>,
}

/// Typed tool listing filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolListFilter {
    pub category: Option<ToolCategory>,
    /// Lowercased search needle.
    pub search: Option<String>,
    pub enabled: Option<bool>,
    pub limit: usize,
}

impl ToolListQuery {
    /// `default_limit` applies when `limit` is absent or zero.
    pub fn into_filter(self, default_limit: usize) -> ApiResult<ToolListFilter> {
        Ok(ToolListFilter {
            category: parse_optional(self.category.as_deref())?,
            search: self
                .search
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            enabled: self.enabled,
            limit: self.limit.filter(|l| *l > 0).unwrap_or(default_limit),
        })
    }
}

/// `GET /tools` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ToolListResponse {
    pub tools: Vec<Tool>,
    /// Matches before the limit was applied.
    pub total: usize,
}

/// Request to register a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterToolRequest {
    /// Slug; derived from the name when omitted.
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
    pub return_type: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    pub enabled: Option<bool>,
}

/// `POST /tools/call` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CallToolRequest {
    pub tool_id: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub params: Option<JsonValue>,
    pub session_id: Option<String>,
    pub agent_id: Option<String>,
}

/// Successful tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CallToolResponse {
    pub tool_id: String,
    /// Id of the tool log written for this call.
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub execution_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub result: JsonValue,
    pub execution_time_ms: i64,
}

/// `POST /tools/execute` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExecuteToolRequest {
    pub tool_id: Option<String>,
    pub action: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub parameters: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExecuteToolResult {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub parameters: JsonValue,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub execution_id: EntityId,
}

/// Simulated execution envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExecuteToolResponse {
    pub success: bool,
    pub tool_id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub timestamp: Timestamp,
    pub result: ExecuteToolResult,
    pub logs: Vec<String>,
}

/// Raw `GET /tools/{id}/executions` query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionsQuery {
    pub status: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// One page of a tool's execution history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionsPage {
    pub executions: Vec<ToolLog>,
    pub total: usize,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}
