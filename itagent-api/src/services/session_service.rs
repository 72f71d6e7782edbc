//! Session Service
//!
//! Sessions, their participants and their message streams. Sessions are
//! never deleted; they end by moving to `completed` or `failed`.

use chrono::Utc;
use itagent_core::{
    new_entity_id, CollaborationStrategy, EntityId, Message, MessageType, Metadata, Session,
    SessionAgent, SessionStatus, Team,
};
use itagent_storage::InMemoryRepository;
use serde_json::Value as JsonValue;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{
    AddMessageRequest, AddSessionAgentRequest, CreateSessionRequest, UpdateSessionRequest,
};
use crate::validation::{parse_optional, ValidateNonEmpty};

/// Sender id used for messages the service posts itself.
pub const SYSTEM_SENDER_ID: &str = "system";

#[derive(Debug, Clone, Default)]
pub struct SessionService {
    sessions: InMemoryRepository<Session>,
}

fn session_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::SessionNotFound)
}

fn participant(session_id: EntityId, name: &str, role: &str, config_id: Option<String>) -> SessionAgent {
    SessionAgent {
        id: new_entity_id(),
        session_id,
        name: name.to_string(),
        role: role.to_string(),
        description: String::new(),
        config_id,
        created_at: Utc::now(),
    }
}

fn empty_session(
    name: String,
    user_id: &str,
    strategy: CollaborationStrategy,
    agents: impl FnOnce(EntityId) -> Vec<SessionAgent>,
) -> Session {
    let now = Utc::now();
    let id = new_entity_id();
    let agents = agents(id);
    Session {
        id,
        name,
        user_id: user_id.to_string(),
        status: SessionStatus::Planning,
        strategy,
        project_id: None,
        team_id: None,
        agent_ids: agents.iter().map(|a| a.id).collect(),
        agents,
        messages: Vec::new(),
        goal: None,
        context_items: Vec::new(),
        session_state: JsonValue::Object(Default::default()),
        created_at: now,
        updated_at: now,
    }
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions owned by `user_id`, newest first.
    pub fn list_sessions(&self, user_id: &str) -> ApiResult<Vec<Session>> {
        let mut sessions = self.sessions.find(|s| s.user_id == user_id)?;
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    pub fn count(&self) -> ApiResult<usize> {
        Ok(self.sessions.count()?)
    }

    /// Every stored session, for cross-session views such as interactions.
    pub fn all_sessions(&self) -> ApiResult<Vec<Session>> {
        Ok(self.sessions.list()?)
    }

    /// Create a session in `planning` with a user and an assistant participant.
    pub fn create_session(&self, user_id: &str, req: CreateSessionRequest) -> ApiResult<Session> {
        let name = req
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::validation_failed("Session name cannot be empty"))?
            .to_string();
        let strategy = parse_optional::<CollaborationStrategy>(req.strategy.as_deref())?
            .unwrap_or_default();

        let mut session = empty_session(name, user_id, strategy, |id| {
            vec![
                participant(id, "User", "user", None),
                participant(id, "Assistant", "assistant", None),
            ]
        });
        session.goal = req.goal.filter(|g| !g.trim().is_empty());
        session.project_id = req.project_id;

        self.sessions.insert(session.clone())?;
        tracing::info!(session_id = %session.id, user_id, "session created");
        Ok(session)
    }

    pub fn get_session(&self, id: EntityId) -> ApiResult<Session> {
        Ok(self.sessions.require(&id)?)
    }

    /// 404 unless the session exists.
    pub fn require_exists(&self, id: EntityId) -> ApiResult<()> {
        self.get_session(id).map(|_| ())
    }

    pub fn update_session(&self, id: EntityId, req: UpdateSessionRequest) -> ApiResult<Session> {
        let name = req
            .name
            .as_ref()
            .map(|n| n.validate_non_empty("name"))
            .transpose()?;
        let status = parse_optional::<SessionStatus>(req.status.as_deref())?;

        self.sessions
            .update(&id, |session| {
                if let Some(name) = name {
                    session.name = name;
                }
                if let Some(goal) = req.goal {
                    session.goal = Some(goal).filter(|g| !g.trim().is_empty());
                }
                if let Some(status) = status {
                    session.status = status;
                }
                if let Some(state) = req.session_state {
                    session.session_state = state;
                }
                if let Some(items) = req.context_items {
                    session.context_items = items;
                }
                session.updated_at = Utc::now();
                Ok::<_, ApiError>(session.clone())
            })?
            .ok_or_else(session_not_found)
    }

    pub fn list_agents(&self, id: EntityId) -> ApiResult<Vec<SessionAgent>> {
        Ok(self.get_session(id)?.agents)
    }

    /// Append a participant and register it in `agentIds`.
    pub fn add_agent(&self, id: EntityId, req: AddSessionAgentRequest) -> ApiResult<SessionAgent> {
        let name = req.name.validate_non_empty("name")?;
        let role = req.role.validate_non_empty("role")?;

        self.sessions
            .update(&id, |session| {
                let mut agent = participant(session.id, &name, &role, req.config_id);
                agent.description = req.description.unwrap_or_default();
                session.agent_ids.push(agent.id);
                session.agents.push(agent.clone());
                session.updated_at = agent.created_at;
                Ok::<_, ApiError>(agent)
            })?
            .ok_or_else(session_not_found)
    }

    /// Messages in arrival order.
    pub fn list_messages(&self, id: EntityId) -> ApiResult<Vec<Message>> {
        Ok(self.get_session(id)?.messages)
    }

    /// Append a message. The first message moves a planning session to active.
    pub fn add_message(&self, id: EntityId, req: AddMessageRequest) -> ApiResult<Message> {
        let sender_id = req.sender_id.validate_non_empty("senderId")?;
        let content = req.content.validate_non_empty("content")?;
        let message_type =
            parse_optional::<MessageType>(req.message_type.as_deref())?.unwrap_or_default();
        let receiver_id = req
            .receiver_id
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let metadata = req.metadata.unwrap_or_default();

        self.sessions
            .update(&id, |session| {
                if let Some(reply_to) = req.reply_to_id {
                    if session.find_message(reply_to).is_none() {
                        return Err(ApiError::validation_failed(format!(
                            "replyToId {} does not match a message in this session",
                            reply_to
                        )));
                    }
                }
                let message = Message {
                    id: new_entity_id(),
                    session_id: session.id,
                    sender_type: session.sender_type_of(&sender_id),
                    sender_id,
                    receiver_id,
                    content,
                    message_type,
                    timestamp: Utc::now(),
                    reply_to_id: req.reply_to_id,
                    metadata,
                };
                if session.status == SessionStatus::Planning {
                    session.status = SessionStatus::Active;
                }
                session.messages.push(message.clone());
                session.updated_at = message.timestamp;
                Ok(message)
            })?
            .ok_or_else(session_not_found)
    }

    /// Create the active session for a team start.
    ///
    /// One participant per member in position order; `initial_message` is
    /// posted as a system message.
    pub fn create_team_session(
        &self,
        team: &Team,
        user_id: &str,
        initial_message: Option<String>,
        metadata: Metadata,
    ) -> ApiResult<Session> {
        let strategy = team.team_type.session_strategy();
        let mut session = empty_session(team.name.clone(), user_id, strategy, |id| {
            team.members
                .iter()
                .map(|m| participant(id, &m.config_id, m.role.as_str(), Some(m.config_id.clone())))
                .collect()
        });
        session.team_id = Some(team.id);
        session.status = SessionStatus::Active;

        if let Some(content) = initial_message.filter(|m| !m.trim().is_empty()) {
            session.messages.push(Message {
                id: new_entity_id(),
                session_id: session.id,
                sender_id: SYSTEM_SENDER_ID.to_string(),
                sender_type: session.sender_type_of(SYSTEM_SENDER_ID),
                receiver_id: None,
                content,
                message_type: MessageType::System,
                timestamp: Utc::now(),
                reply_to_id: None,
                metadata,
            });
        }

        self.sessions.insert(session.clone())?;
        tracing::info!(session_id = %session.id, team_id = %team.id, "team session created");
        Ok(session)
    }
}
