//! Staff approval pipeline.
//!
//! Batch approve/reject of team assignments and name/site change requests.
//! Items are processed in the order given and each outcome is reported
//! individually: a capacity failure or bad id marks that item failed and the
//! batch moves on. Nothing here is all-or-nothing across items.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::capacity::CapacityLedger;
use crate::db::Repository;
use crate::errors::{AppError, ErrorDetails};
use crate::models::{PendingOverview, RequestKind, Team, TeamStatus};
use crate::notify::{kinds, Notifier};

/// Whether a batch item was an approval or a rejection.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Approve,
    Reject,
}

/// Per-item result of a batch call, reported in input order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub team_id: String,
    pub action: BatchAction,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

impl BatchOutcome {
    fn applied(team_id: &str, action: BatchAction) -> Self {
        Self {
            team_id: team_id.to_string(),
            action,
            applied: true,
            error: None,
        }
    }

    fn failed(team_id: &str, action: BatchAction, error: &AppError) -> Self {
        if error.is_infrastructure() {
            tracing::error!(team_id, %error, "Batch item aborted by store failure");
        }
        Self {
            team_id: team_id.to_string(),
            action,
            applied: false,
            error: Some(ErrorDetails::from_error(error)),
        }
    }
}

/// Applies staff decisions to the team registry and capacity ledger.
#[derive(Clone)]
pub struct ApprovalPipeline {
    repo: Arc<Repository>,
    ledger: Arc<CapacityLedger>,
    notifier: Notifier,
}

impl ApprovalPipeline {
    pub fn new(repo: Arc<Repository>, ledger: Arc<CapacityLedger>, notifier: Notifier) -> Self {
        Self {
            repo,
            ledger,
            notifier,
        }
    }

    /// Everything awaiting a staff decision in one competition.
    pub async fn pending_overview(&self, competition_id: &str) -> Result<PendingOverview, AppError> {
        Ok(PendingOverview {
            teams_awaiting_approval: self.repo.list_full_pending_teams(competition_id).await?,
            name_requests: self
                .repo
                .list_pending_requests(competition_id, RequestKind::Name)
                .await?,
            site_requests: self
                .repo
                .list_pending_requests(competition_id, RequestKind::Site)
                .await?,
        })
    }

    /// Approve team assignments: reserve capacity and mark REGISTERED.
    pub async fn approve_team_assignment(
        &self,
        competition_id: &str,
        team_ids: &[String],
    ) -> Result<Vec<BatchOutcome>, AppError> {
        let mut outcomes = Vec::with_capacity(team_ids.len());
        for team_id in team_ids {
            let outcome = match self.approve_one_team(competition_id, team_id).await {
                Ok(()) => BatchOutcome::applied(team_id, BatchAction::Approve),
                Err(e) => BatchOutcome::failed(team_id, BatchAction::Approve, &e),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn approve_one_team(&self, competition_id: &str, team_id: &str) -> Result<(), AppError> {
        let team = self.require_team(competition_id, team_id).await?;

        // Retried approvals of an already-registered team must not reserve
        // a second seat.
        if team.status == TeamStatus::Registered {
            return Ok(());
        }
        if !team.is_full() {
            return Err(AppError::Validation(format!(
                "Team {} has {} of {} participants",
                team_id,
                team.participants.len(),
                team.team_size
            )));
        }

        let site_id = team
            .pending_site_id
            .clone()
            .or_else(|| team.site_id.clone())
            .ok_or_else(|| {
                AppError::Validation(format!("Team {} has no site to register at", team_id))
            })?;

        self.ledger.reserve(&site_id, 1).await?;
        if let Err(e) = self.repo.register_team(team_id, &site_id).await {
            // Undo the reservation if the status flip failed.
            self.ledger.release(&site_id, 1).await.ok();
            return Err(e);
        }

        self.notifier.notify(
            kinds::TEAM_REGISTERED,
            team.participants.clone(),
            json!({ "teamId": team_id, "siteId": site_id }),
        );
        Ok(())
    }

    /// Decide name change requests: approvals apply `pending_name`,
    /// rejections discard it.
    pub async fn decide_name_changes(
        &self,
        competition_id: &str,
        approve_ids: &[String],
        reject_ids: &[String],
    ) -> Result<Vec<BatchOutcome>, AppError> {
        let mut outcomes = Vec::with_capacity(approve_ids.len() + reject_ids.len());

        for team_id in approve_ids {
            let outcome = match self.approve_one_name(competition_id, team_id).await {
                Ok(()) => BatchOutcome::applied(team_id, BatchAction::Approve),
                Err(e) => BatchOutcome::failed(team_id, BatchAction::Approve, &e),
            };
            outcomes.push(outcome);
        }
        for team_id in reject_ids {
            let outcome = match self.reject_one_name(competition_id, team_id).await {
                Ok(()) => BatchOutcome::applied(team_id, BatchAction::Reject),
                Err(e) => BatchOutcome::failed(team_id, BatchAction::Reject, &e),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn approve_one_name(&self, competition_id: &str, team_id: &str) -> Result<(), AppError> {
        let team = self.require_team(competition_id, team_id).await?;
        let new_name = team.pending_name.clone().ok_or_else(|| {
            AppError::NotFound(format!("No name change pending for team {}", team_id))
        })?;

        self.repo.apply_name_change(team_id).await?;

        self.notifier.notify(
            kinds::NAME_CHANGE_APPROVED,
            team.participants.clone(),
            json!({ "teamId": team_id, "newName": new_name }),
        );
        Ok(())
    }

    async fn reject_one_name(&self, competition_id: &str, team_id: &str) -> Result<(), AppError> {
        let team = self.require_team(competition_id, team_id).await?;
        let rejected = team.pending_name.clone().ok_or_else(|| {
            AppError::NotFound(format!("No name change pending for team {}", team_id))
        })?;

        self.repo.discard_name_change(team_id).await?;

        self.notifier.notify(
            kinds::NAME_CHANGE_REJECTED,
            team.participants.clone(),
            json!({ "teamId": team_id, "rejectedName": rejected }),
        );
        Ok(())
    }

    /// Decide site change requests.
    ///
    /// An approval reserves the new site before releasing the old one, so a
    /// full target site fails the item and leaves the team's current
    /// reservation untouched; the request stays pending for a later retry.
    pub async fn decide_site_changes(
        &self,
        competition_id: &str,
        approve_ids: &[String],
        reject_ids: &[String],
    ) -> Result<Vec<BatchOutcome>, AppError> {
        let mut outcomes = Vec::with_capacity(approve_ids.len() + reject_ids.len());

        for team_id in approve_ids {
            let outcome = match self.approve_one_site(competition_id, team_id).await {
                Ok(()) => BatchOutcome::applied(team_id, BatchAction::Approve),
                Err(e) => BatchOutcome::failed(team_id, BatchAction::Approve, &e),
            };
            outcomes.push(outcome);
        }
        for team_id in reject_ids {
            let outcome = match self.reject_one_site(competition_id, team_id).await {
                Ok(()) => BatchOutcome::applied(team_id, BatchAction::Reject),
                Err(e) => BatchOutcome::failed(team_id, BatchAction::Reject, &e),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn approve_one_site(&self, competition_id: &str, team_id: &str) -> Result<(), AppError> {
        let team = self.require_team(competition_id, team_id).await?;
        let new_site_id = team.pending_site_id.clone().ok_or_else(|| {
            AppError::NotFound(format!("No site change pending for team {}", team_id))
        })?;

        // Only registered teams hold capacity; pending teams just move their
        // provisional choice.
        if team.status == TeamStatus::Registered && team.site_id.as_deref() != Some(&new_site_id) {
            self.ledger.reserve(&new_site_id, 1).await?;
            if let Some(old_site_id) = &team.site_id {
                self.ledger.release(old_site_id, 1).await?;
            }
        }

        if let Err(e) = self.repo.apply_site_change(team_id).await {
            if team.status == TeamStatus::Registered
                && team.site_id.as_deref() != Some(&new_site_id)
            {
                // Undo the swap if the record update failed.
                self.ledger.release(&new_site_id, 1).await.ok();
                if let Some(old_site_id) = &team.site_id {
                    self.ledger.reserve(old_site_id, 1).await.ok();
                }
            }
            return Err(e);
        }

        self.notifier.notify(
            kinds::SITE_CHANGE_APPROVED,
            team.participants.clone(),
            json!({ "teamId": team_id, "newSiteId": new_site_id }),
        );
        Ok(())
    }

    async fn reject_one_site(&self, competition_id: &str, team_id: &str) -> Result<(), AppError> {
        let team = self.require_team(competition_id, team_id).await?;
        let rejected = team.pending_site_id.clone().ok_or_else(|| {
            AppError::NotFound(format!("No site change pending for team {}", team_id))
        })?;

        self.repo.discard_site_change(team_id).await?;

        self.notifier.notify(
            kinds::SITE_CHANGE_REJECTED,
            team.participants.clone(),
            json!({ "teamId": team_id, "rejectedSiteId": rejected }),
        );
        Ok(())
    }

    async fn require_team(&self, competition_id: &str, team_id: &str) -> Result<Team, AppError> {
        self.repo
            .get_team(team_id)
            .await?
            .filter(|t| t.competition_id == competition_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Team {} not found in competition {}",
                    team_id, competition_id
                ))
            })
    }
}
