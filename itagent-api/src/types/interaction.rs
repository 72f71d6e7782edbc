//! Interaction history types

use itagent_core::{EntityId, ExportFormat, Message, MessageType, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ApiResult;
use crate::validation::{parse_csv_list, parse_optional, split_keywords};

/// Raw interaction query string shared by list, stats and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionQuery {
    pub session_id: Option<EntityId>,
    pub task_id: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    /// Comma-separated message types.
    pub types: Option<String>,
    /// Comma-separated, case-insensitive, any-match on content.
    pub keywords: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Export only: json | csv.
    pub format: Option<String>,
}

/// Typed interaction filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionFilter {
    pub session_id: Option<EntityId>,
    /// Matches `metadata.taskId`.
    pub task_id: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub types: Option<Vec<MessageType>>,
    /// Lowercased.
    pub keywords: Vec<String>,
    pub limit: usize,
    pub offset: usize,
}

impl InteractionQuery {
    pub fn into_filter(self, default_limit: usize) -> ApiResult<InteractionFilter> {
        Ok(InteractionFilter {
            session_id: self.session_id,
            task_id: self
                .task_id
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            start_date: self.start_date,
            end_date: self.end_date,
            types: parse_csv_list(self.types.as_deref())?,
            keywords: split_keywords(self.keywords.as_deref()),
            limit: self.limit.filter(|l| *l > 0).unwrap_or(default_limit),
            offset: self.offset.unwrap_or(0),
        })
    }

    /// Requested export format, JSON when absent.
    pub fn export_format(&self) -> ApiResult<ExportFormat> {
        Ok(parse_optional(self.format.as_deref())?.unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InteractionListResponse {
    pub interactions: Vec<Message>,
    /// Matches before pagination.
    pub total: usize,
}

/// Aggregate view of an agent's interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct InteractionStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub sent: usize,
    pub received: usize,
    pub by_session: BTreeMap<String, usize>,
    /// 24 buckets, UTC hour of day.
    pub by_hour: Vec<usize>,
    /// Mean delay between a message to the agent and its next reply in the
    /// same session; `None` when there is no such pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_response_time_ms: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() -> ApiResult<()> {
        let filter = InteractionQuery::default().into_filter(20)?;
        assert_eq!(filter.limit, 20);
        assert_eq!(filter.offset, 0);
        assert!(filter.types.is_none());
        Ok(())
    }

    #[test]
    fn test_export_format() -> ApiResult<()> {
        let mut query = InteractionQuery::default();
        assert_eq!(query.export_format()?, ExportFormat::Json);
        query.format = Some("CSV".to_string());
        assert_eq!(query.export_format()?, ExportFormat::Csv);
        query.format = Some("xml".to_string());
        assert!(query.export_format().is_err());
        Ok(())
    }
}
