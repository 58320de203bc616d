//! Staff approval endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::approval::BatchOutcome;
use crate::models::{ApproveTeamsRequest, DecideRequestsRequest, PendingOverview};
use crate::AppState;

/// GET /api/competitions/:id/pending - Everything awaiting a staff decision.
pub async fn pending_overview(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
) -> ApiResult<PendingOverview> {
    let overview = state.approvals.pending_overview(&competition_id).await?;
    success(overview)
}

/// POST /api/competitions/:id/approvals/teams - Approve team assignments.
pub async fn approve_teams(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<ApproveTeamsRequest>,
) -> ApiResult<Vec<BatchOutcome>> {
    let outcomes = state
        .approvals
        .approve_team_assignment(&competition_id, &request.team_ids)
        .await?;
    success(outcomes)
}

/// POST /api/competitions/:id/approvals/names - Decide name change requests.
pub async fn decide_name_changes(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<DecideRequestsRequest>,
) -> ApiResult<Vec<BatchOutcome>> {
    let outcomes = state
        .approvals
        .decide_name_changes(&competition_id, &request.approve_ids, &request.reject_ids)
        .await?;
    success(outcomes)
}

/// POST /api/competitions/:id/approvals/sites - Decide site change requests.
pub async fn decide_site_changes(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<DecideRequestsRequest>,
) -> ApiResult<Vec<BatchOutcome>> {
    let outcomes = state
        .approvals
        .decide_site_changes(&competition_id, &request.approve_ids, &request.reject_ids)
        .await?;
    success(outcomes)
}
