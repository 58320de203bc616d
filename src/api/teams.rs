//! Team lifecycle endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    JoinIndividualRequest, JoinWithCodeRequest, NameChangeRequest, SiteChangeRequest, Team,
    TeamStatus, WithdrawRequest,
};
use crate::AppState;

/// Query parameters for listing teams.
#[derive(Debug, Deserialize)]
pub struct ListTeamsQuery {
    pub status: Option<String>,
}

/// POST /api/competitions/:id/teams/join - Join a competition individually.
pub async fn join_individual(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<JoinIndividualRequest>,
) -> ApiResult<Team> {
    let team = state
        .registry
        .join_individual(&competition_id, &request)
        .await?;
    success(team)
}

/// POST /api/teams/join - Join an existing team by code.
pub async fn join_with_code(
    State(state): State<AppState>,
    Json(request): Json<JoinWithCodeRequest>,
) -> ApiResult<Team> {
    let team = state.registry.join_with_code(&request).await?;
    success(team)
}

/// GET /api/teams/:id - Get a single team.
pub async fn get_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Team> {
    let team = state
        .repo
        .get_team(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))?;
    success(team)
}

/// GET /api/competitions/:id/teams - List a competition's teams.
pub async fn list_teams(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Query(query): Query<ListTeamsQuery>,
) -> ApiResult<Vec<Team>> {
    let status = match query.status.as_deref() {
        Some(s) => Some(TeamStatus::from_str(s).ok_or_else(|| {
            AppError::Validation(format!("Unknown team status \"{}\"", s))
        })?),
        None => None,
    };

    let teams = state.repo.list_teams(&competition_id, status).await?;
    success(teams)
}

/// POST /api/competitions/:id/withdraw - Withdraw a student from their team.
pub async fn withdraw(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<WithdrawRequest>,
) -> ApiResult<Team> {
    let team = state
        .registry
        .withdraw(&competition_id, &request.user_id)
        .await?;
    success(team)
}

/// POST /api/teams/:id/name-change - Request a team name change.
pub async fn request_name_change(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<NameChangeRequest>,
) -> ApiResult<Team> {
    let team = state.registry.request_name_change(&id, &request).await?;
    success(team)
}

/// POST /api/teams/:id/site-change - Request a team site change.
pub async fn request_site_change(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SiteChangeRequest>,
) -> ApiResult<Team> {
    let team = state.registry.request_site_change(&id, &request).await?;
    success(team)
}

/// POST /api/competitions/:id/close - Close registration.
pub async fn close_registration(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let unregistered = state.registry.close_registration(&competition_id).await?;
    success(serde_json::json!({ "unregisteredTeams": unregistered }))
}
