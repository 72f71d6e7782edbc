//! Interaction Service
//!
//! Read-only view over session messages from one agent's point of view.
//! An interaction is any message the agent sent or received.

use std::collections::{BTreeMap, HashMap};

use chrono::Timelike;
use itagent_core::{slugify, EntityId, ExportFormat, Message, Session, Timestamp};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::services::SessionService;
use crate::types::{InteractionFilter, InteractionListResponse, InteractionStats};

const CSV_HEADER: &str = "id,content,type,sender,receiver,session,timestamp";

/// Download name for an export. The agent id is slugged so the name is safe
/// inside a quoted `Content-Disposition` parameter.
fn export_filename(agent_id: &str, format: ExportFormat) -> String {
    let slug = slugify(agent_id);
    let slug = if slug.is_empty() { "unknown".to_string() } else { slug };
    format!("agent-{}-interactions.{}", slug, format)
}

/// A rendered export file.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionExport {
    pub body: String,
    pub content_type: &'static str,
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct InteractionService {
    sessions: SessionService,
}

fn matches_filter(message: &Message, filter: &InteractionFilter) -> bool {
    filter.session_id.map_or(true, |s| message.session_id == s)
        && filter.task_id.as_deref().map_or(true, |task| {
            message.metadata.get("taskId").and_then(|v| v.as_str()) == Some(task)
        })
        && filter.start_date.map_or(true, |t| message.timestamp >= t)
        && filter.end_date.map_or(true, |t| message.timestamp <= t)
        && filter
            .types
            .as_ref()
            .map_or(true, |types| types.contains(&message.message_type))
        && (filter.keywords.is_empty() || {
            let content = message.content.to_lowercase();
            filter.keywords.iter().any(|k| content.contains(k.as_str()))
        })
}

fn newest_first(messages: &mut [Message]) {
    messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Mean delay in ms between a message reaching `agent_id` and the agent's
/// next message in the same session.
fn average_response_time(agent_id: &str, sessions: &[Session], filter: &InteractionFilter) -> Option<f64> {
    let mut total_ms = 0i64;
    let mut pairs = 0u32;
    for session in sessions {
        let mut messages: Vec<&Message> = session
            .messages
            .iter()
            .filter(|m| m.involves(agent_id) && matches_filter(m, filter))
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

        let mut waiting_since: Option<Timestamp> = None;
        for message in messages {
            if message.sender_id == agent_id {
                if let Some(received) = waiting_since.take() {
                    total_ms += (message.timestamp - received).num_milliseconds();
                    pairs += 1;
                }
            } else if waiting_since.is_none() {
                waiting_since = Some(message.timestamp);
            }
        }
    }
    (pairs > 0).then(|| total_ms as f64 / f64::from(pairs))
}

impl InteractionService {
    pub fn new(sessions: SessionService) -> Self {
        Self { sessions }
    }

    fn matching(&self, agent_id: &str, filter: &InteractionFilter) -> ApiResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .sessions
            .all_sessions()?
            .into_iter()
            .flat_map(|s| s.messages)
            .filter(|m| m.involves(agent_id) && matches_filter(m, filter))
            .collect();
        newest_first(&mut messages);
        Ok(messages)
    }

    /// One page of the agent's interactions, newest first.
    pub fn list(&self, agent_id: &str, filter: &InteractionFilter) -> ApiResult<InteractionListResponse> {
        let messages = self.matching(agent_id, filter)?;
        let total = messages.len();
        let interactions = messages
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();
        Ok(InteractionListResponse { interactions, total })
    }

    pub fn detail(&self, agent_id: &str, interaction_id: EntityId) -> ApiResult<Message> {
        let message = self
            .sessions
            .all_sessions()?
            .into_iter()
            .find_map(|s| s.find_message(interaction_id).cloned())
            .ok_or_else(|| ApiError::from_code(ErrorCode::InteractionNotFound))?;
        if !message.involves(agent_id) {
            tracing::debug!(agent_id, interaction_id = %interaction_id, "interaction access denied");
            return Err(ApiError::forbidden("Access to this interaction is denied"));
        }
        Ok(message)
    }

    /// Aggregates over every matching interaction; pagination is ignored.
    pub fn stats(&self, agent_id: &str, filter: &InteractionFilter) -> ApiResult<InteractionStats> {
        let sessions = self.sessions.all_sessions()?;
        let mut stats = InteractionStats {
            total: 0,
            by_type: BTreeMap::new(),
            sent: 0,
            received: 0,
            by_session: BTreeMap::new(),
            by_hour: vec![0; 24],
            average_response_time_ms: average_response_time(agent_id, &sessions, filter),
        };

        for message in sessions
            .iter()
            .flat_map(|s| s.messages.iter())
            .filter(|m| m.involves(agent_id) && matches_filter(m, filter))
        {
            stats.total += 1;
            *stats
                .by_type
                .entry(message.message_type.as_str().to_string())
                .or_default() += 1;
            if message.sender_id == agent_id {
                stats.sent += 1;
            } else {
                stats.received += 1;
            }
            *stats
                .by_session
                .entry(message.session_id.to_string())
                .or_default() += 1;
            stats.by_hour[message.timestamp.hour() as usize] += 1;
        }
        Ok(stats)
    }

    /// Render every matching interaction; pagination is ignored.
    pub fn export(
        &self,
        agent_id: &str,
        filter: &InteractionFilter,
        format: ExportFormat,
    ) -> ApiResult<InteractionExport> {
        let messages = self.matching(agent_id, filter)?;
        let body = match format {
            ExportFormat::Json => serde_json::to_string_pretty(&messages)?,
            ExportFormat::Csv => {
                let sessions: HashMap<EntityId, Session> = self
                    .sessions
                    .all_sessions()?
                    .into_iter()
                    .map(|s| (s.id, s))
                    .collect();
                let describe = |session_id: EntityId, participant: &str| {
                    sessions
                        .get(&session_id)
                        .map(|s| s.describe_participant(participant))
                        .unwrap_or_else(|| participant.to_string())
                };

                let mut lines = Vec::with_capacity(messages.len() + 1);
                lines.push(CSV_HEADER.to_string());
                for m in &messages {
                    let receiver = m
                        .receiver_id
                        .as_deref()
                        .map(|r| describe(m.session_id, r))
                        .unwrap_or_default();
                    lines.push(format!(
                        "{},{},{},{},{},{},{}",
                        m.id,
                        csv_quote(&m.content),
                        m.message_type,
                        csv_quote(&describe(m.session_id, &m.sender_id)),
                        csv_quote(&receiver),
                        m.session_id,
                        m.timestamp.to_rfc3339(),
                    ));
                }
                lines.join("\n")
            }
        };
        tracing::info!(agent_id, format = %format, count = messages.len(), "interactions exported");
        Ok(InteractionExport {
            body,
            content_type: format.content_type(),
            filename: export_filename(agent_id, format),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddMessageRequest, AddSessionAgentRequest, CreateSessionRequest};
    use itagent_core::{new_entity_id, MessageType};
    use serde_json::json;

    struct Fixture {
        service: InteractionService,
        sessions: SessionService,
        session_id: EntityId,
        agent_id: String,
    }

    fn fixture() -> ApiResult<Fixture> {
        let sessions = SessionService::new();
        let session = sessions.create_session(
            "u1",
            CreateSessionRequest {
                name: Some("review".to_string()),
                ..Default::default()
            },
        )?;
        let agent = sessions.add_agent(
            session.id,
            AddSessionAgentRequest {
                name: Some("Critic".to_string()),
                role: Some("expert".to_string()),
                ..Default::default()
            },
        )?;
        Ok(Fixture {
            service: InteractionService::new(sessions.clone()),
            sessions,
            session_id: session.id,
            agent_id: agent.id.to_string(),
        })
    }

    fn post(f: &Fixture, from: &str, to: Option<&str>, content: &str) -> ApiResult<Message> {
        f.sessions.add_message(
            f.session_id,
            AddMessageRequest {
                sender_id: Some(from.to_string()),
                receiver_id: to.map(str::to_string),
                content: Some(content.to_string()),
                ..Default::default()
            },
        )
    }

    fn filter() -> InteractionFilter {
        InteractionFilter {
            limit: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_list_only_involving_agent() -> ApiResult<()> {
        let f = fixture()?;
        post(&f, "user-1", Some(&f.agent_id), "please review")?;
        post(&f, &f.agent_id, Some("user-1"), "looks good")?;
        post(&f, "user-1", Some("user-2"), "unrelated")?;

        let out = f.service.list(&f.agent_id, &filter())?;
        assert_eq!(out.total, 2);
        assert_eq!(out.interactions[0].content, "looks good");

        let page = f.service.list(
            &f.agent_id,
            &InteractionFilter {
                limit: 1,
                offset: 1,
                ..Default::default()
            },
        )?;
        assert_eq!(page.total, 2);
        assert_eq!(page.interactions.len(), 1);
        assert_eq!(page.interactions[0].content, "please review");
        Ok(())
    }

    #[test]
    fn test_keyword_and_type_filters() -> ApiResult<()> {
        let f = fixture()?;
        post(&f, "user-1", Some(&f.agent_id), "Check the BUILD")?;
        post(&f, "user-1", Some(&f.agent_id), "hello")?;

        let by_keyword = f.service.list(
            &f.agent_id,
            &InteractionFilter {
                keywords: vec!["build".to_string()],
                ..filter()
            },
        )?;
        assert_eq!(by_keyword.total, 1);

        let by_type = f.service.list(
            &f.agent_id,
            &InteractionFilter {
                types: Some(vec![MessageType::Code]),
                ..filter()
            },
        )?;
        assert_eq!(by_type.total, 0);
        Ok(())
    }

    #[test]
    fn test_detail_access() -> ApiResult<()> {
        let f = fixture()?;
        let message = post(&f, "user-1", Some("user-2"), "private")?;

        let err = f.service.detail(&f.agent_id, message.id).err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::Forbidden));
        let err = f.service.detail(&f.agent_id, new_entity_id()).err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::InteractionNotFound));
        assert_eq!(f.service.detail("user-2", message.id)?.content, "private");
        Ok(())
    }

    #[test]
    fn test_stats() -> ApiResult<()> {
        let f = fixture()?;
        post(&f, "user-1", Some(&f.agent_id), "question")?;
        post(&f, &f.agent_id, Some("user-1"), "answer")?;

        let stats = f.service.stats(&f.agent_id, &filter())?;
        assert_eq!(stats.total, 2);
        assert_eq!((stats.sent, stats.received), (1, 1));
        assert_eq!(stats.by_type.get("text"), Some(&2));
        assert_eq!(stats.by_hour.len(), 24);
        assert_eq!(stats.by_hour.iter().sum::<usize>(), 2);
        let avg = stats.average_response_time_ms;
        assert!(avg.is_some_and(|ms| ms >= 0.0));
        Ok(())
    }

    #[test]
    fn test_stats_without_replies() -> ApiResult<()> {
        let f = fixture()?;
        post(&f, "user-1", Some(&f.agent_id), "anyone?")?;
        let stats = f.service.stats(&f.agent_id, &filter())?;
        assert_eq!(stats.average_response_time_ms, None);
        Ok(())
    }

    #[test]
    fn test_csv_export_escapes_quotes() -> ApiResult<()> {
        let f = fixture()?;
        post(&f, "user-1", Some(&f.agent_id), "say \"hi\", then stop")?;

        let export = f.service.export(&f.agent_id, &filter(), ExportFormat::Csv)?;
        let mut lines = export.body.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap_or_default();
        assert!(row.contains("\"say \"\"hi\"\", then stop\""));
        assert!(row.contains("\"Critic (expert)\""));
        assert!(row.contains("\"user-1\""));
        assert_eq!(export.filename, format!("agent-{}-interactions.csv", f.agent_id));
        assert!(export.content_type.starts_with("text/csv"));
        Ok(())
    }

    #[test]
    fn test_json_export_ignores_pagination() -> ApiResult<()> {
        let f = fixture()?;
        for i in 0..3 {
            post(&f, "user-1", Some(&f.agent_id), &format!("m{}", i))?;
        }
        let export = f.service.export(
            &f.agent_id,
            &InteractionFilter {
                limit: 1,
                ..Default::default()
            },
            ExportFormat::Json,
        )?;
        let parsed: serde_json::Value = serde_json::from_str(&export.body)?;
        assert_eq!(parsed.as_array().map(Vec::len), Some(3));
        assert!(export.body.contains('\n'));
        assert_eq!(parsed[0]["content"], json!("m2"));
        Ok(())
    }

    #[test]
    fn test_export_filename_strips_header_breaking_characters() {
        let name = export_filename("evil\"; filename=\"x.exe\r\n", ExportFormat::Csv);
        assert_eq!(name, "agent-evil-filename-x-exe-interactions.csv");
        assert!(!name.contains(['"', ';', '\r', '\n', ' ']));
        assert_eq!(export_filename("\"\"", ExportFormat::Json), "agent-unknown-interactions.json");
    }
}
