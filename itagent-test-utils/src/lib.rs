//! iT-Agent Test Utilities
//!
//! Shared test infrastructure for the iT-Agent workspace:
//! - Proptest generators for entity and enum types
//! - Fixtures for common scenarios (sessions with participants, teams)
//! - Assertions for entity invariants

// Re-export storage types used by service tests
pub use itagent_storage::{InMemoryRepository, StorageError};

// Re-export core types for convenience
pub use itagent_core::{
    new_entity_id, AgentConfig, AgentRole, AgentTemplate, Capability, CapabilityType, CollaborationStrategy, EntityId,
    MemberRole, Message, MessageType, Metadata, RatingBook, SenderType, Session, SessionAgent,
    SessionStatus, Task, TaskPriority, TaskStatus, TaskType, Team, TeamMember, TeamStatus,
    TeamType, TemplateCategory, Timestamp, Tool, ToolCategory, ToolLog, ToolLogStatus, ToolParamType,
    ToolParameter, RATING_RANGE,
};

use chrono::Utc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for iT-Agent entity types.

    use super::*;
    use proptest::prelude::*;

    // === Identity ===

    /// Generate a random UUID.
    pub fn arb_entity_id() -> impl Strategy<Value = EntityId> {
        any::<[u8; 16]>().prop_map(uuid::Uuid::from_bytes)
    }

    /// Generate a Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    /// Generate a non-blank display name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 _-]{0,31}"
    }

    /// Generate non-blank message content, including CSV-sensitive characters.
    pub fn arb_message_content() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9.!?][a-zA-Z0-9 .!?]{0,63}",
            "[a-z ]{0,16}\"[a-z ]{0,16}\"[a-z ]{0,16}",
            "[a-z]{1,8},[a-z]{1,8}\n[a-z]{1,8}",
        ]
    }

    // === Enums ===

    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop::sample::select(TaskStatus::ALL)
    }

    pub fn arb_task_priority() -> impl Strategy<Value = TaskPriority> {
        prop::sample::select(TaskPriority::ALL)
    }

    pub fn arb_task_type() -> impl Strategy<Value = TaskType> {
        prop::sample::select(TaskType::ALL)
    }

    pub fn arb_session_status() -> impl Strategy<Value = SessionStatus> {
        prop::sample::select(SessionStatus::ALL)
    }

    pub fn arb_message_type() -> impl Strategy<Value = MessageType> {
        prop::sample::select(MessageType::ALL)
    }

    pub fn arb_team_type() -> impl Strategy<Value = TeamType> {
        prop::sample::select(TeamType::ALL)
    }

    pub fn arb_member_role() -> impl Strategy<Value = MemberRole> {
        prop::sample::select(MemberRole::ALL)
    }

    pub fn arb_capability_type() -> impl Strategy<Value = CapabilityType> {
        prop::sample::select(CapabilityType::ALL)
    }

    /// A sequence of status transitions, for lifecycle invariants.
    pub fn arb_status_walk() -> impl Strategy<Value = Vec<TaskStatus>> {
        prop::collection::vec(arb_task_status(), 1..12)
    }

    // === Ratings ===

    /// A rating inside [`RATING_RANGE`].
    pub fn arb_valid_rating() -> impl Strategy<Value = f64> {
        RATING_RANGE
    }

    /// A rating outside [`RATING_RANGE`], fractional or whole.
    pub fn arb_out_of_range_rating() -> impl Strategy<Value = f64> {
        prop_oneof![-100.0..0.99f64, 5.01..100.0f64]
    }

    // === Entities ===

    /// Generate a task with consistent lifecycle timestamps.
    pub fn arb_task() -> impl Strategy<Value = Task> {
        (
            arb_entity_id(),
            arb_name(),
            arb_task_priority(),
            arb_task_type(),
            arb_status_walk(),
            arb_timestamp(),
        )
            .prop_map(|(id, name, priority, task_type, walk, now)| {
                let mut task = Task::new(id, name, now);
                task.priority = priority;
                task.task_type = task_type;
                for status in walk {
                    task.apply_status(status, now);
                }
                task
            })
    }

    /// Generate a team whose members are ordered by position.
    pub fn arb_team(owner: String) -> impl Strategy<Value = Team> {
        (
            arb_entity_id(),
            arb_name(),
            arb_team_type(),
            prop::collection::vec((arb_member_role(), 0u32..50), 0..8),
            arb_timestamp(),
        )
            .prop_map(move |(id, name, team_type, slots, now)| {
                let mut team = fixtures::team(owner.clone(), team_type, 0);
                team.id = id;
                team.name = name;
                team.created_at = now;
                team.updated_at = now;
                team.members = slots
                    .into_iter()
                    .enumerate()
                    .map(|(i, (role, position))| {
                        fixtures::team_member(id, &format!("config-{}", i), role, position)
                    })
                    .collect();
                team.sort_members();
                team
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built entities for common testing scenarios.

    use super::*;

    /// A pending task with default priority and type.
    pub fn pending_task(name: &str) -> Task {
        Task::new(new_entity_id(), name, Utc::now())
    }

    /// A participant record for `session_id`.
    pub fn session_agent(session_id: EntityId, name: &str, role: &str) -> SessionAgent {
        SessionAgent {
            id: new_entity_id(),
            session_id,
            name: name.to_string(),
            role: role.to_string(),
            description: String::new(),
            config_id: None,
            created_at: Utc::now(),
        }
    }

    /// A planning session with no participants or messages.
    pub fn empty_session(user_id: &str) -> Session {
        let now = Utc::now();
        Session {
            id: new_entity_id(),
            name: "test-session".to_string(),
            user_id: user_id.to_string(),
            status: SessionStatus::Planning,
            strategy: CollaborationStrategy::default(),
            project_id: None,
            team_id: None,
            agent_ids: Vec::new(),
            agents: Vec::new(),
            messages: Vec::new(),
            goal: None,
            context_items: Vec::new(),
            session_state: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    /// A session with a planner and a coder participant.
    pub fn session_with_agents(user_id: &str) -> Session {
        let mut session = empty_session(user_id);
        let planner = session_agent(session.id, "Planner", "planner");
        let coder = session_agent(session.id, "Coder", "coder");
        session.agent_ids = vec![planner.id, coder.id];
        session.agents = vec![planner, coder];
        session
    }

    /// A text message from `sender_id`, optionally addressed to `receiver_id`.
    pub fn message(
        session_id: EntityId,
        sender_id: &str,
        receiver_id: Option<&str>,
        content: &str,
        timestamp: Timestamp,
    ) -> Message {
        Message {
            id: new_entity_id(),
            session_id,
            sender_id: sender_id.to_string(),
            sender_type: SenderType::Agent,
            receiver_id: receiver_id.map(str::to_string),
            content: content.to_string(),
            message_type: MessageType::Text,
            timestamp,
            reply_to_id: None,
            metadata: Metadata::new(),
        }
    }

    /// A member slot referencing agent configuration `config_id`.
    pub fn team_member(
        team_id: EntityId,
        config_id: &str,
        role: MemberRole,
        position: u32,
    ) -> TeamMember {
        TeamMember {
            id: new_entity_id(),
            team_id,
            config_id: config_id.to_string(),
            role,
            position,
            is_required: false,
            metadata: Metadata::new(),
            created_at: Utc::now(),
        }
    }

    /// An active team owned by `owner` with `members` member slots.
    pub fn team(owner: String, team_type: TeamType, members: u32) -> Team {
        let now = Utc::now();
        let id = new_entity_id();
        Team {
            id,
            name: "test-team".to_string(),
            description: None,
            team_type,
            status: TeamStatus::Active,
            created_by: owner,
            members: (0..members)
                .map(|i| team_member(id, &format!("config-{}", i), MemberRole::Member, i))
                .collect(),
            metadata: Metadata::new(),
            last_session_id: None,
            last_started_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An unrated public template for `role`.
    pub fn template(name: &str, role: &str) -> AgentTemplate {
        let now = Utc::now();
        AgentTemplate {
            id: new_entity_id(),
            name: name.to_string(),
            description: String::new(),
            role: role.to_string(),
            config: serde_json::json!({}),
            tags: Vec::new(),
            created_by: None,
            is_public: true,
            category: TemplateCategory::General,
            usage_count: 0,
            is_featured: false,
            recommendation_order: None,
            rating: 0.0,
            rating_count: 0,
            ratings: RatingBook::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// An agent configuration with the role's starter prompt and color.
    pub fn agent_config(name: &str, role: AgentRole) -> AgentConfig {
        let mut config = AgentConfig::new(
            new_entity_id(),
            name,
            role,
            role.default_system_message(),
            Utc::now(),
        );
        config.color = role.default_color().to_string();
        config
    }

    /// An unrated capability of `capability_type`.
    pub fn capability(name: &str, capability_type: CapabilityType) -> Capability {
        let now = Utc::now();
        Capability {
            id: new_entity_id(),
            name: name.to_string(),
            description: String::new(),
            capability_type,
            parameters: serde_json::json!({}),
            rating: 0.0,
            rating_count: 0,
            ratings: RatingBook::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// An enabled custom tool with one required string parameter `input`.
    pub fn custom_tool(id: &str) -> Tool {
        let now = Utc::now();
        Tool {
            id: id.to_string(),
            name: id.to_string(),
            description: "Test tool".to_string(),
            category: ToolCategory::Custom,
            tags: Vec::new(),
            is_builtin: false,
            enabled: true,
            parameters: vec![ToolParameter::required(
                "input",
                ToolParamType::String,
                "Input value",
            )],
            return_type: None,
            examples: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for entity invariants.

    use super::*;

    /// `completedAt` is present exactly when the task is completed.
    pub fn assert_completion_consistent(task: &Task) {
        assert_eq!(
            task.completed_at.is_some(),
            task.status == TaskStatus::Completed,
            "completedAt {:?} inconsistent with status {}",
            task.completed_at,
            task.status
        );
        if task.status.is_terminal() {
            assert!(task.ended_at.is_some(), "terminal task without endedAt");
        }
    }

    /// Members are ordered by non-decreasing position.
    pub fn assert_members_ordered(team: &Team) {
        let positions: Vec<u32> = team.members.iter().map(|m| m.position).collect();
        assert!(
            positions.windows(2).all(|w| w[0] <= w[1]),
            "members out of order: {:?}",
            positions
        );
    }

    /// A rating aggregate lies within [`RATING_RANGE`] unless empty.
    pub fn assert_rating_in_range(rating: f64, count: u64) {
        if count == 0 {
            assert_eq!(rating, 0.0);
        } else {
            let (min, max) = (*RATING_RANGE.start(), *RATING_RANGE.end());
            assert!(
                rating >= min - 1e-9 && rating <= max + 1e-9,
                "rating {} outside {}..={}",
                rating,
                min,
                max
            );
        }
    }

    /// Messages are stored in non-decreasing timestamp order.
    pub fn assert_messages_chronological(session: &Session) {
        assert!(
            session
                .messages
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp),
            "session messages out of order"
        );
    }

    /// The result is a storage `NotFound` for `entity`.
    pub fn assert_not_found<T: std::fmt::Debug>(result: &Result<T, StorageError>, entity: &str) {
        match result {
            Err(StorageError::NotFound { entity: found, .. }) => assert_eq!(*found, entity),
            other => panic!("expected {} NotFound, got {:?}", entity, other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pending_task_fixture() {
        let task = fixtures::pending_task("write docs");
        assert_eq!(task.status, TaskStatus::Pending);
        assertions::assert_completion_consistent(&task);
    }

    #[test]
    fn test_session_with_agents_fixture() {
        let session = fixtures::session_with_agents("alice");
        assert_eq!(session.agents.len(), 2);
        assert_eq!(session.agent_ids.len(), 2);
        let planner = &session.agents[0];
        assert_eq!(
            session.describe_participant(&planner.id.to_string()),
            "Planner (planner)"
        );
    }

    #[test]
    fn test_team_fixture_is_ordered() {
        let team = fixtures::team("alice".to_string(), TeamType::Workflow, 3);
        assert!(team.is_owned_by("alice"));
        assertions::assert_members_ordered(&team);
        assert_eq!(team.next_position(), 3);
    }

    #[test]
    fn test_agent_config_fixture_is_storable() {
        let config = fixtures::agent_config("Critic", AgentRole::Critic);
        assert_eq!(config.color, AgentRole::Critic.default_color());

        let repo: InMemoryRepository<AgentConfig> = InMemoryRepository::new();
        assert!(repo.insert(config.clone()).is_ok());
        assertions::assert_not_found(&repo.require(&new_entity_id()), "Agent config");
        assert!(matches!(repo.get(&config.id), Ok(Some(c)) if c.name == "Critic"));
    }

    #[test]
    fn test_missing_entity_assertion() {
        let repo: InMemoryRepository<Task> = InMemoryRepository::new();
        assertions::assert_not_found(&repo.require(&new_entity_id()), "Task");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_tasks_keep_completion_invariant(task in generators::arb_task()) {
            assertions::assert_completion_consistent(&task);
        }

        #[test]
        fn prop_generated_teams_are_ordered(team in generators::arb_team("owner".to_string())) {
            assertions::assert_members_ordered(&team);
        }

        #[test]
        fn prop_rating_book_average_in_range(
            ratings in prop::collection::vec(generators::arb_valid_rating(), 0..20)
        ) {
            let mut book = RatingBook::default();
            for rating in &ratings {
                book.record(None, *rating);
            }
            assertions::assert_rating_in_range(book.average(), book.count());
        }
    }
}
