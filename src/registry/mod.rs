//! Team registry: team lifecycle and membership.
//!
//! Owns every transition of the team state machine. A team is created
//! PENDING when its first student joins, becomes REGISTERED only through the
//! approval pipeline, falls back to PENDING when a withdrawal breaks a full
//! roster, and ends UNREGISTERED when registration closes on an incomplete
//! roster or the last member leaves.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::capacity::CapacityLedger;
use crate::db::Repository;
use crate::directory::Directory;
use crate::errors::AppError;
use crate::models::{
    JoinIndividualRequest, JoinWithCodeRequest, NameChangeRequest, RequestKind, Role,
    SiteChangeRequest, Team, TeamStatus,
};
use crate::notify::{kinds, Notifier};
use crate::sites::SiteEngine;

/// Owns team records and the pending requests tied to them.
#[derive(Clone)]
pub struct TeamRegistry {
    repo: Arc<Repository>,
    ledger: Arc<CapacityLedger>,
    sites: Arc<SiteEngine>,
    directory: Directory,
    notifier: Notifier,
}

impl TeamRegistry {
    pub fn new(
        repo: Arc<Repository>,
        ledger: Arc<CapacityLedger>,
        sites: Arc<SiteEngine>,
        directory: Directory,
        notifier: Notifier,
    ) -> Self {
        Self {
            repo,
            ledger,
            sites,
            directory,
            notifier,
        }
    }

    /// A student joins a competition individually.
    ///
    /// Joins the oldest open team of their university if one exists,
    /// otherwise creates a fresh PENDING team of size 1 at the requested (or
    /// default) site.
    pub async fn join_individual(
        &self,
        competition_id: &str,
        request: &JoinIndividualRequest,
    ) -> Result<Team, AppError> {
        let competition = self
            .repo
            .get_competition(competition_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Competition {} not found", competition_id))
            })?;
        if !competition.registration_open {
            return Err(AppError::Validation(
                "Registration for this competition is closed".to_string(),
            ));
        }

        let user = self.directory.user(&request.user_id).await?;
        if user.role != Role::Student {
            return Err(AppError::Validation(
                "Only students can join a competition".to_string(),
            ));
        }
        if self
            .repo
            .find_team_of_user(competition_id, &request.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyRegistered(format!(
                "User {} already has a team in this competition",
                request.user_id
            )));
        }

        let university_id = self.directory.university_of(&request.user_id).await?;

        // Prefer an existing open team from the same university.
        if let Some(open_team) = self
            .repo
            .find_open_team(competition_id, &university_id)
            .await?
        {
            return self.add_member(&open_team, &request.user_id).await;
        }

        let site_id = match &request.site_id {
            Some(site_id) => {
                let site = self
                    .repo
                    .get_site(site_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Site {} not found", site_id)))?;
                if site.competition_id != competition_id {
                    return Err(AppError::Validation(
                        "Site belongs to a different competition".to_string(),
                    ));
                }
                site.id
            }
            None => {
                self.sites
                    .default_site(competition_id, &university_id)
                    .await?
            }
        };

        let team_code = new_team_code();
        let team = Team {
            id: Uuid::new_v4().to_string(),
            competition_id: competition_id.to_string(),
            university_id,
            name: request
                .team_name
                .clone()
                .unwrap_or_else(|| format!("Team {}", team_code)),
            pending_name: None,
            name_approved: false,
            status: TeamStatus::Pending,
            level: request.level.clone().unwrap_or_else(|| "Open".to_string()),
            site_id: Some(site_id),
            pending_site_id: None,
            team_code,
            participants: vec![request.user_id.clone()],
            team_size: competition.team_size,
            created_at: Utc::now().to_rfc3339(),
        };
        self.repo.create_team(&team).await?;
        Ok(team)
    }

    /// A student joins an existing team by its code.
    pub async fn join_with_code(&self, request: &JoinWithCodeRequest) -> Result<Team, AppError> {
        let team = self
            .repo
            .get_team_by_code(&request.team_code)
            .await?
            .filter(|t| t.status != TeamStatus::Unregistered)
            .ok_or_else(|| {
                AppError::InvalidCode(format!("Team code {} is not valid", request.team_code))
            })?;

        let user = self.directory.user(&request.user_id).await?;
        if user.role != Role::Student {
            return Err(AppError::Validation(
                "Only students can join a team".to_string(),
            ));
        }
        if self
            .repo
            .find_team_of_user(&team.competition_id, &request.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyRegistered(format!(
                "User {} already has a team in this competition",
                request.user_id
            )));
        }

        self.add_member(&team, &request.user_id).await
    }

    /// Shared join path: roster capacity check, insert, completion notice.
    async fn add_member(&self, team: &Team, user_id: &str) -> Result<Team, AppError> {
        if team.is_full() {
            return Err(AppError::TeamFull(format!(
                "Team {} already has {} participants",
                team.id, team.team_size
            )));
        }

        self.repo.add_team_member(&team.id, user_id).await?;

        let team = self
            .repo
            .get_team(&team.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", team.id)))?;

        // A full roster surfaces to the approval pipeline; tell the team.
        if team.is_full() {
            self.notifier.notify(
                kinds::TEAM_COMPLETE,
                team.participants.clone(),
                json!({ "teamId": team.id, "teamName": team.name }),
            );
        }
        Ok(team)
    }

    /// A student withdraws from their team in a competition.
    pub async fn withdraw(&self, competition_id: &str, user_id: &str) -> Result<Team, AppError> {
        let team = self
            .repo
            .find_team_of_user(competition_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "User {} has no team in competition {}",
                    user_id, competition_id
                ))
            })?;

        let was_registered = team.status == TeamStatus::Registered;
        let remaining = self.repo.remove_team_member(&team.id, user_id).await?;

        // A registered team losing a member frees its site seat immediately.
        if was_registered && remaining < team.team_size {
            if let Some(site_id) = &team.site_id {
                self.ledger.release(site_id, 1).await?;
            }
        }

        if remaining == 0 {
            self.repo
                .set_team_status(&team.id, TeamStatus::Unregistered)
                .await?;
        } else if was_registered && remaining < team.team_size {
            self.repo
                .set_team_status(&team.id, TeamStatus::Pending)
                .await?;
        }

        let team = self
            .repo
            .get_team(&team.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", team.id)))?;

        if !team.participants.is_empty() {
            let mut recipients = team.participants.clone();
            recipients.extend(self.repo.list_coach_ids(&team.university_id).await?);
            self.notifier.notify(
                kinds::MEMBER_WITHDREW,
                recipients,
                json!({
                    "teamId": team.id,
                    "teamName": team.name,
                    "userId": user_id,
                    "status": team.status,
                }),
            );
        }
        Ok(team)
    }

    /// Request a team name change for staff approval.
    pub async fn request_name_change(
        &self,
        team_id: &str,
        request: &NameChangeRequest,
    ) -> Result<Team, AppError> {
        if request.new_name.trim().is_empty() {
            return Err(AppError::Validation("Team name is required".to_string()));
        }

        let team = self.require_team(team_id).await?;
        if self
            .repo
            .get_pending_request(team_id, RequestKind::Name)
            .await?
            .is_some()
        {
            return Err(AppError::RequestAlreadyPending(format!(
                "Team {} already has a name change awaiting a decision",
                team_id
            )));
        }

        self.repo
            .stage_name_change(team_id, &request.new_name)
            .await?;

        self.notifier.notify(
            kinds::NAME_CHANGE_REQUESTED,
            team.participants.clone(),
            json!({ "teamId": team_id, "requestedName": request.new_name }),
        );

        self.require_team(team_id).await
    }

    /// Request a site change for staff approval.
    ///
    /// The target site's headroom is pre-checked; the seat itself is only
    /// reserved when staff approve.
    pub async fn request_site_change(
        &self,
        team_id: &str,
        request: &SiteChangeRequest,
    ) -> Result<Team, AppError> {
        let team = self.require_team(team_id).await?;

        let site = self
            .repo
            .get_site(&request.new_site_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Site {} not found", request.new_site_id))
            })?;
        if site.competition_id != team.competition_id {
            return Err(AppError::Validation(
                "Site belongs to a different competition".to_string(),
            ));
        }
        if team.site_id.as_deref() == Some(request.new_site_id.as_str()) {
            return Err(AppError::Validation(
                "Team is already assigned to this site".to_string(),
            ));
        }

        if self
            .repo
            .get_pending_request(team_id, RequestKind::Site)
            .await?
            .is_some()
        {
            return Err(AppError::RequestAlreadyPending(format!(
                "Team {} already has a site change awaiting a decision",
                team_id
            )));
        }

        self.sites.validate_site_change(&request.new_site_id).await?;
        self.repo
            .stage_site_change(team_id, &request.new_site_id)
            .await?;

        self.notifier.notify(
            kinds::SITE_CHANGE_REQUESTED,
            team.participants.clone(),
            json!({ "teamId": team_id, "requestedSiteId": request.new_site_id }),
        );

        self.require_team(team_id).await
    }

    /// Close registration for a competition.
    ///
    /// Incomplete PENDING teams become UNREGISTERED (terminal) and are
    /// notified; returns how many teams were shut out.
    pub async fn close_registration(&self, competition_id: &str) -> Result<usize, AppError> {
        let competition = self
            .repo
            .get_competition(competition_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Competition {} not found", competition_id))
            })?;

        let shut_out = self.repo.close_registration(&competition.id).await?;
        for team in &shut_out {
            self.notifier.notify(
                kinds::TEAM_UNREGISTERED,
                team.participants.clone(),
                json!({ "teamId": team.id, "teamName": team.name }),
            );
        }
        Ok(shut_out.len())
    }

    async fn require_team(&self, team_id: &str) -> Result<Team, AppError> {
        self.repo
            .get_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", team_id)))
    }
}

/// Short join code shared with teammates.
fn new_team_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}
