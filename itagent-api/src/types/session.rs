//! Session-related API types

use itagent_core::{EntityId, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Request to create a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    /// sequential | orchestrated | parallel | adaptive
    pub strategy: Option<String>,
    pub goal: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub project_id: Option<EntityId>,
}

/// Partial session update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub status: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub session_state: Option<JsonValue>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<Object>>))]
    pub context_items: Option<Vec<JsonValue>>,
}

/// Request to add a participant to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AddSessionAgentRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub config_id: Option<String>,
}

/// Request to post a message to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AddMessageRequest {
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    pub content: Option<String>,
    /// text | code | image | file | system | error | result
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<Metadata>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub reply_to_id: Option<EntityId>,
}
