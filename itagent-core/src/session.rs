//! Session, participant and message entities

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    CollaborationStrategy, EntityId, MessageType, Metadata, SenderType, SessionStatus, Timestamp,
};

/// A participant record inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionAgent {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_id: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// A single message posted to a session. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub session_id: EntityId,
    pub sender_id: String,
    pub sender_type: SenderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub timestamp: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub metadata: Metadata,
}

impl Message {
    /// Whether `agent_id` sent or received this message.
    pub fn involves(&self, agent_id: &str) -> bool {
        self.sender_id == agent_id || self.receiver_id.as_deref() == Some(agent_id)
    }
}

/// A collaboration instance grouping agents, messages and a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
    /// Owning user.
    pub user_id: String,
    pub status: SessionStatus,
    pub strategy: CollaborationStrategy,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    #[serde(default)]
    pub agent_ids: Vec<EntityId>,
    #[serde(default)]
    pub agents: Vec<SessionAgent>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    #[serde(default)]
    pub context_items: Vec<JsonValue>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub session_state: JsonValue,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Session {
    pub fn find_agent(&self, id: &str) -> Option<&SessionAgent> {
        self.agents.iter().find(|a| a.id.to_string() == id)
    }

    pub fn find_message(&self, id: EntityId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Render a participant reference for human-facing exports.
    ///
    /// Known participants render as `name (role)`, anything else as the raw id.
    pub fn describe_participant(&self, id: &str) -> String {
        match self.find_agent(id) {
            Some(agent) => format!("{} ({})", agent.name, agent.role),
            None => id.to_string(),
        }
    }

    /// Sender classification: participants are agents, everyone else a user.
    pub fn sender_type_of(&self, sender_id: &str) -> SenderType {
        if self.find_agent(sender_id).is_some() {
            SenderType::Agent
        } else {
            SenderType::User
        }
    }
}
