//! Agent team entities

use serde::{Deserialize, Serialize};

use crate::{EntityId, MemberRole, Metadata, TeamStatus, TeamType, Timestamp};

/// A member slot in a team, referencing an agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub team_id: EntityId,
    pub config_id: String,
    pub role: MemberRole,
    pub position: u32,
    #[serde(default)]
    pub is_required: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub metadata: Metadata,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// An ownership-scoped group of agent configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub team_type: TeamType,
    pub status: TeamStatus,
    /// Owner. Only this user may read, change or start the team.
    pub created_by: String,
    /// Ordered by `position`.
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub metadata: Metadata,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_started_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Team {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }

    pub fn find_member(&self, member_id: EntityId) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Restore `position` order after an insert or update. Stable for ties.
    pub fn sort_members(&mut self) {
        self.members.sort_by_key(|m| m.position);
    }

    /// Position one past the current last member.
    pub fn next_position(&self) -> u32 {
        self.members
            .iter()
            .map(|m| m.position + 1)
            .max()
            .unwrap_or(0)
    }
}
