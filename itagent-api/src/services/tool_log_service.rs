//! Tool Log Service
//!
//! Append-only store of tool invocations plus the read paths over it.

use chrono::{Duration, Utc};
use itagent_core::{EntityId, ToolLog};
use itagent_storage::InMemoryRepository;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{ToolLogQuery, ToolLogQueryMode};

#[derive(Debug, Clone)]
pub struct ToolLogService {
    logs: InMemoryRepository<ToolLog>,
    recent_default: usize,
}

fn newest_first(logs: &mut [ToolLog]) {
    logs.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
}

fn matches_query(log: &ToolLog, query: &ToolLogQuery) -> bool {
    query.tool_id.as_deref().map_or(true, |t| log.tool_id == t)
        && query.session_id.as_deref().map_or(true, |s| log.session_id == s)
        && query.agent_id.as_deref().map_or(true, |a| log.agent_id == a)
        && query.status.map_or(true, |s| log.status == s)
        && query.start_time.map_or(true, |t| log.start_time >= t)
        && query.end_time.map_or(true, |t| log.end_time <= t)
}

impl ToolLogService {
    /// `recent_default` answers `?recent` values that are missing, zero or unparsable.
    pub fn new(recent_default: usize) -> Self {
        Self {
            logs: InMemoryRepository::new(),
            recent_default,
        }
    }

    pub fn append(&self, log: ToolLog) -> ApiResult<()> {
        self.logs.insert(log)?;
        Ok(())
    }

    /// Answer a query according to its [`ToolLogQueryMode`]. Always newest first.
    pub fn query(&self, query: &ToolLogQuery) -> ApiResult<Vec<ToolLog>> {
        match query.mode(self.recent_default) {
            ToolLogQueryMode::Recent(n) => {
                let mut logs = self.logs.list()?;
                newest_first(&mut logs);
                logs.truncate(n);
                Ok(logs)
            }
            ToolLogQueryMode::Session(session_id) => {
                let mut logs = self.logs.find(|l| l.session_id == session_id)?;
                newest_first(&mut logs);
                Ok(logs)
            }
            ToolLogQueryMode::Filter => {
                let mut logs = self.logs.find(|l| matches_query(l, query))?;
                newest_first(&mut logs);
                Ok(logs)
            }
        }
    }

    /// Every log of one tool, newest first.
    pub fn for_tool(&self, tool_id: &str) -> ApiResult<Vec<ToolLog>> {
        let mut logs = self.logs.find(|l| l.tool_id == tool_id)?;
        newest_first(&mut logs);
        Ok(logs)
    }

    pub fn get_log(&self, id: EntityId) -> ApiResult<ToolLog> {
        self.logs
            .get(&id)?
            .ok_or_else(|| ApiError::from_code(ErrorCode::ToolLogNotFound))
    }

    /// Drop logs that ended more than `days` days ago. Returns the count removed.
    ///
    /// A window reaching past the earliest representable timestamp keeps
    /// every log.
    pub fn clear_old_logs(&self, days: i64) -> ApiResult<usize> {
        if days < 0 {
            return Err(ApiError::invalid_range("days", 0, i64::MAX));
        }
        let cutoff = Duration::try_days(days).and_then(|d| Utc::now().checked_sub_signed(d));
        let Some(cutoff) = cutoff else {
            tracing::debug!(days, "retention window predates every log; nothing cleared");
            return Ok(0);
        };
        let removed = self.logs.retain(|l| l.end_time >= cutoff)?;
        tracing::info!(days, removed, "old tool logs cleared");
        Ok(removed)
    }
}
