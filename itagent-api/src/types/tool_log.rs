//! Tool-log query types

use itagent_core::{Timestamp, ToolLogStatus};
use serde::{Deserialize, Serialize};

/// `GET /tool-logs` query. All fields are optional and ANDed together,
/// except `recent`, which overrides everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolLogQuery {
    pub tool_id: Option<String>,
    pub session_id: Option<String>,
    pub agent_id: Option<String>,
    pub status: Option<ToolLogStatus>,
    /// Keep logs that started at or after this instant.
    pub start_time: Option<Timestamp>,
    /// Keep logs that ended at or before this instant.
    pub end_time: Option<Timestamp>,
    /// Raw value; unparsable or zero means the default count.
    pub recent: Option<String>,
}

/// How a [`ToolLogQuery`] is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLogQueryMode {
    /// The `n` newest logs, ignoring every other field.
    Recent(usize),
    /// All logs of one session.
    Session(String),
    /// General AND filter over the remaining fields.
    Filter,
}

impl ToolLogQuery {
    /// Resolve the query mode. `recent` wins, then a lone `sessionId`.
    pub fn mode(&self, recent_default: usize) -> ToolLogQueryMode {
        if let Some(raw) = &self.recent {
            let n = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(recent_default);
            return ToolLogQueryMode::Recent(n);
        }

        let only_session = self.tool_id.is_none()
            && self.agent_id.is_none()
            && self.status.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none();
        match &self.session_id {
            Some(session_id) if only_session => ToolLogQueryMode::Session(session_id.clone()),
            _ => ToolLogQueryMode::Filter,
        }
    }
}

/// `DELETE /tool-logs` query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearLogsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClearLogsResponse {
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_overrides_other_fields() {
        let query = ToolLogQuery {
            session_id: Some("s1".to_string()),
            tool_id: Some("t".to_string()),
            recent: Some("5".to_string()),
            ..Default::default()
        };
        assert_eq!(query.mode(10), ToolLogQueryMode::Recent(5));
    }

    #[test]
    fn test_unparsable_or_zero_recent_falls_back() {
        for raw in ["abc", "0", "-3", ""] {
            let query = ToolLogQuery {
                recent: Some(raw.to_string()),
                ..Default::default()
            };
            assert_eq!(query.mode(10), ToolLogQueryMode::Recent(10), "recent={raw}");
        }
    }

    #[test]
    fn test_lone_session_id_selects_session_mode() {
        let query = ToolLogQuery {
            session_id: Some("s1".to_string()),
            ..Default::default()
        };
        assert_eq!(query.mode(10), ToolLogQueryMode::Session("s1".to_string()));

        let query = ToolLogQuery {
            session_id: Some("s1".to_string()),
            status: Some(ToolLogStatus::Error),
            ..Default::default()
        };
        assert_eq!(query.mode(10), ToolLogQueryMode::Filter);
        assert_eq!(ToolLogQuery::default().mode(10), ToolLogQueryMode::Filter);
    }
}
