//! Team Service
//!
//! Ownership-scoped agent teams. Every operation takes the authenticated
//! caller; anything touching an existing team checks existence (404) and
//! then ownership (403). Ownership is re-checked inside the write lock for
//! mutations.

use chrono::Utc;
use itagent_core::{new_entity_id, EntityId, MemberRole, Team, TeamMember, TeamStatus, TeamType};
use itagent_storage::InMemoryRepository;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::services::SessionService;
use crate::types::{
    AddTeamMemberRequest, CreateTeamRequest, DeletedResponse, StartTeamRequest,
    StartTeamResponse, TeamMemberResponse, UpdateTeamMemberRequest, UpdateTeamRequest,
};
use crate::validation::{parse_optional, ValidateNonEmpty};

#[derive(Debug, Clone)]
pub struct TeamService {
    teams: InMemoryRepository<Team>,
    sessions: SessionService,
}

fn team_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::TeamNotFound)
}

fn member_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::TeamMemberNotFound)
}

fn not_owner() -> ApiError {
    ApiError::forbidden("Only the team owner can access this team")
}

fn ensure_owner(team: &Team, caller: &str) -> ApiResult<()> {
    if team.is_owned_by(caller) {
        Ok(())
    } else {
        Err(not_owner())
    }
}

impl TeamService {
    /// `sessions` receives the sessions created by [`start_team`](Self::start_team).
    pub fn new(sessions: SessionService) -> Self {
        Self {
            teams: InMemoryRepository::new(),
            sessions,
        }
    }

    /// Apply `f` to an owned team under the write lock.
    fn update_owned<R>(
        &self,
        id: EntityId,
        caller: &str,
        f: impl FnOnce(&mut Team) -> ApiResult<R>,
    ) -> ApiResult<R> {
        self.teams
            .update(&id, |team| {
                ensure_owner(team, caller)?;
                team.updated_at = Utc::now();
                f(team)
            })?
            .ok_or_else(team_not_found)
    }

    /// The caller's teams, newest first.
    pub fn list_teams(&self, caller: &str) -> ApiResult<Vec<Team>> {
        let mut teams = self.teams.find(|t| t.is_owned_by(caller))?;
        teams.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(teams)
    }

    pub fn create_team(&self, caller: &str, req: CreateTeamRequest) -> ApiResult<Team> {
        let name = req.name.validate_non_empty("name")?;
        let team_type: TeamType = req.team_type.validate_non_empty("type")?.parse()?;

        let now = Utc::now();
        let team = Team {
            id: new_entity_id(),
            name,
            description: req.description.filter(|d| !d.trim().is_empty()),
            team_type,
            status: TeamStatus::Inactive,
            created_by: caller.to_string(),
            members: Vec::new(),
            metadata: req.metadata.unwrap_or_default(),
            last_session_id: None,
            last_started_at: None,
            created_at: now,
            updated_at: now,
        };
        self.teams.insert(team.clone())?;
        tracing::info!(team_id = %team.id, owner = caller, "team created");
        Ok(team)
    }

    pub fn get_team(&self, id: EntityId, caller: &str) -> ApiResult<Team> {
        let team = self.teams.get(&id)?.ok_or_else(team_not_found)?;
        ensure_owner(&team, caller)?;
        Ok(team)
    }

    pub fn update_team(&self, id: EntityId, caller: &str, req: UpdateTeamRequest) -> ApiResult<Team> {
        let name = req
            .name
            .as_ref()
            .map(|n| n.validate_non_empty("name"))
            .transpose()?;
        let status = parse_optional::<TeamStatus>(req.status.as_deref())?;

        self.update_owned(id, caller, |team| {
            if let Some(name) = name {
                team.name = name;
            }
            if let Some(description) = req.description {
                team.description = Some(description).filter(|d| !d.trim().is_empty());
            }
            if let Some(status) = status {
                team.status = status;
            }
            if let Some(metadata) = req.metadata {
                team.metadata = metadata;
            }
            Ok(team.clone())
        })
    }

    pub fn delete_team(&self, id: EntityId, caller: &str) -> ApiResult<DeletedResponse> {
        self.get_team(id, caller)?;
        self.teams.remove(&id)?.ok_or_else(team_not_found)?;
        tracing::info!(team_id = %id, "team deleted");
        Ok(DeletedResponse { id, deleted: true })
    }

    // ========================================================================
    // MEMBERS
    // ========================================================================

    pub fn add_member(
        &self,
        id: EntityId,
        caller: &str,
        req: AddTeamMemberRequest,
    ) -> ApiResult<TeamMemberResponse> {
        let config_id = req.config_id.validate_non_empty("configId")?;
        let role: MemberRole = req.role.validate_non_empty("role")?.parse()?;

        self.update_owned(id, caller, |team| {
            let member = TeamMember {
                id: new_entity_id(),
                team_id: team.id,
                config_id,
                role,
                position: req.position.unwrap_or_else(|| team.next_position()),
                is_required: req.is_required.unwrap_or(false),
                metadata: req.metadata.unwrap_or_default(),
                created_at: Utc::now(),
            };
            team.members.push(member.clone());
            team.sort_members();
            Ok(TeamMemberResponse {
                team: team.clone(),
                member,
            })
        })
    }

    pub fn update_member(
        &self,
        id: EntityId,
        member_id: EntityId,
        caller: &str,
        req: UpdateTeamMemberRequest,
    ) -> ApiResult<TeamMemberResponse> {
        let role = parse_optional::<MemberRole>(req.role.as_deref())?;

        self.update_owned(id, caller, |team| {
            let member = team
                .members
                .iter_mut()
                .find(|m| m.id == member_id)
                .ok_or_else(member_not_found)?;
            if let Some(role) = role {
                member.role = role;
            }
            if let Some(position) = req.position {
                member.position = position;
            }
            if let Some(is_required) = req.is_required {
                member.is_required = is_required;
            }
            if let Some(metadata) = req.metadata {
                member.metadata = metadata;
            }
            let member = member.clone();
            team.sort_members();
            Ok(TeamMemberResponse {
                team: team.clone(),
                member,
            })
        })
    }

    pub fn remove_member(&self, id: EntityId, member_id: EntityId, caller: &str) -> ApiResult<Team> {
        self.update_owned(id, caller, |team| {
            team.find_member(member_id).ok_or_else(member_not_found)?;
            team.members.retain(|m| m.id != member_id);
            Ok(team.clone())
        })
    }

    // ========================================================================
    // START
    // ========================================================================

    /// Start a collaboration session for the team.
    ///
    /// Archived teams cannot start and each team type has a minimum member
    /// count. Both are checked under the team write lock, and the session
    /// is built from that same state, so a concurrent member removal either
    /// lands before the check or after the start. Lock order is team, then
    /// session.
    pub fn start_team(
        &self,
        id: EntityId,
        caller: &str,
        req: StartTeamRequest,
    ) -> ApiResult<StartTeamResponse> {
        let (session, team) = self.update_owned(id, caller, |team| {
            if team.status == TeamStatus::Archived {
                return Err(ApiError::validation_failed("Archived teams cannot be started"));
            }
            let min = team.team_type.min_members();
            if team.members.len() < min {
                return Err(ApiError::validation_failed(format!(
                    "A {} team needs at least {} member(s) to start; it has {}",
                    team.team_type,
                    min,
                    team.members.len()
                )));
            }

            let session = self.sessions.create_team_session(
                team,
                caller,
                req.initial_message,
                req.metadata.unwrap_or_default(),
            )?;
            team.status = TeamStatus::Active;
            team.last_session_id = Some(session.id);
            team.last_started_at = Some(session.created_at);
            Ok((session, team.clone()))
        })?;

        tracing::info!(team_id = %id, session_id = %session.id, "team started");
        Ok(StartTeamResponse {
            session_id: session.id,
            team_id: id,
            team_type: team.team_type,
            message: format!("Team {} started", team.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "owner-1";
    const INTRUDER: &str = "intruder";

    fn service() -> (TeamService, SessionService) {
        let sessions = SessionService::new();
        (TeamService::new(sessions.clone()), sessions)
    }

    fn team(service: &TeamService, team_type: &str) -> ApiResult<Team> {
        service.create_team(
            OWNER,
            CreateTeamRequest {
                name: Some("Research".to_string()),
                team_type: Some(team_type.to_string()),
                ..Default::default()
            },
        )
    }

    fn add(service: &TeamService, id: EntityId, role: &str) -> ApiResult<TeamMemberResponse> {
        service.add_member(
            id,
            OWNER,
            AddTeamMemberRequest {
                config_id: Some(format!("cfg-{}", role)),
                role: Some(role.to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_non_owner_is_forbidden() -> ApiResult<()> {
        let (service, _) = service();
        let team = team(&service, "workflow")?;
        add(&service, team.id, "leader")?;

        let err = service
            .start_team(team.id, INTRUDER, StartTeamRequest::default())
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::Forbidden));
        assert_eq!(service.get_team(team.id, OWNER)?.status, TeamStatus::Inactive);
        assert!(service.get_team(team.id, INTRUDER).is_err());
        assert!(service.list_teams(INTRUDER)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_team_is_404_before_ownership() {
        let (service, _) = service();
        let err = service.get_team(new_entity_id(), INTRUDER).err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::TeamNotFound));
    }

    #[test]
    fn test_member_role_is_validated() -> ApiResult<()> {
        let (service, _) = service();
        let team = team(&service, "workflow")?;
        let err = add(&service, team.id, "boss").err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ValidationFailed));
        let err = service
            .add_member(team.id, OWNER, AddTeamMemberRequest::default())
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::MissingField));
        Ok(())
    }

    #[test]
    fn test_members_stay_ordered_by_position() -> ApiResult<()> {
        let (service, _) = service();
        let team = team(&service, "parallel")?;
        let first = service.add_member(
            team.id,
            OWNER,
            AddTeamMemberRequest {
                config_id: Some("cfg-lead".to_string()),
                role: Some("leader".to_string()),
                position: Some(5),
                ..Default::default()
            },
        )?;
        let second = add(&service, team.id, "member")?;
        assert_eq!(second.member.position, 6);
        assert_eq!(second.team.members[0].id, first.member.id);

        let moved = service.update_member(
            team.id,
            first.member.id,
            OWNER,
            UpdateTeamMemberRequest {
                position: Some(9),
                ..Default::default()
            },
        )?;
        assert_eq!(moved.team.members[1].id, first.member.id);

        let remaining = service.remove_member(team.id, first.member.id, OWNER)?;
        assert_eq!(remaining.members.len(), 1);
        assert!(service
            .remove_member(team.id, first.member.id, OWNER)
            .is_err());
        Ok(())
    }

    #[test]
    fn test_conversation_needs_two_members() -> ApiResult<()> {
        let (service, sessions) = service();
        let team = team(&service, "conversation")?;
        add(&service, team.id, "leader")?;
        assert!(service.start_team(team.id, OWNER, StartTeamRequest::default()).is_err());
        assert!(sessions.list_sessions(OWNER)?.is_empty());

        add(&service, team.id, "member")?;
        let started = service.start_team(
            team.id,
            OWNER,
            StartTeamRequest {
                initial_message: Some("Kick off".to_string()),
                metadata: None,
            },
        )?;
        let session = sessions.get_session(started.session_id)?;
        assert_eq!(session.team_id, Some(team.id));
        assert_eq!(session.agents.len(), 2);
        assert_eq!(session.messages.len(), 1);
        assert_eq!(
            session.strategy,
            itagent_core::CollaborationStrategy::Orchestrated
        );

        let stored = service.get_team(team.id, OWNER)?;
        assert_eq!(stored.status, TeamStatus::Active);
        assert_eq!(stored.last_session_id, Some(session.id));
        Ok(())
    }

    #[test]
    fn test_archived_team_cannot_start() -> ApiResult<()> {
        let (service, _) = service();
        let team = team(&service, "workflow")?;
        add(&service, team.id, "leader")?;
        service.update_team(
            team.id,
            OWNER,
            UpdateTeamRequest {
                status: Some("archived".to_string()),
                ..Default::default()
            },
        )?;
        let err = service.start_team(team.id, OWNER, StartTeamRequest::default()).err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ValidationFailed));
        Ok(())
    }

    #[test]
    fn test_start_racing_member_removal_uses_checked_roster() -> ApiResult<()> {
        let (service, sessions) = service();
        let mut starts = 0;
        for _ in 0..100 {
            let team = team(&service, "conversation")?;
            add(&service, team.id, "leader")?;
            let member = add(&service, team.id, "member")?.member;
            let barrier = std::sync::Barrier::new(2);

            let started = std::thread::scope(|scope| {
                let starter = scope.spawn(|| {
                    barrier.wait();
                    service.start_team(team.id, OWNER, StartTeamRequest::default()).ok()
                });
                scope.spawn(|| {
                    barrier.wait();
                    service.remove_member(team.id, member.id, OWNER).is_ok()
                });
                starter.join().ok().flatten()
            });

            if let Some(started) = started {
                starts += 1;
                let session = sessions.get_session(started.session_id)?;
                assert_eq!(session.agents.len(), 2, "session built from an unchecked roster");
            } else {
                assert_eq!(service.get_team(team.id, OWNER)?.status, TeamStatus::Inactive);
            }
        }
        // A rejected start leaves no session behind.
        assert_eq!(sessions.list_sessions(OWNER)?.len(), starts);
        Ok(())
    }
}
