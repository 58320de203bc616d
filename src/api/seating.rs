//! Seat assignment endpoints.

use std::collections::HashMap;

use axum::extract::{Path, State};
use serde_json::json;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::SeatAssignment;
use crate::notify::kinds;
use crate::seating::{assign_seats, SeatingTeam};
use crate::AppState;

/// POST /api/sites/:id/seating - Run seat assignment for a site.
///
/// Computes seats for every REGISTERED team at the site and commits the
/// result in one transaction, replacing any earlier run. On
/// `InsufficientSeats` nothing is committed and the previous map survives.
pub async fn run_seating(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> ApiResult<Vec<SeatAssignment>> {
    if state.repo.get_site(&site_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Site {} not found", site_id)));
    }

    let labs = state.repo.list_labs(&site_id).await?;
    if labs.is_empty() {
        return Err(AppError::Validation(format!(
            "Site {} has no seat map configured",
            site_id
        )));
    }

    let teams = state.repo.list_registered_teams_at_site(&site_id).await?;
    let seating_teams: Vec<SeatingTeam> = teams.iter().map(SeatingTeam::from).collect();

    let assignments = assign_seats(&site_id, &seating_teams, &labs)?;
    state
        .repo
        .replace_seat_assignments(&site_id, &assignments)
        .await?;

    tracing::info!(
        site_id,
        teams = assignments.len(),
        "Committed seat assignment run"
    );

    let rosters: HashMap<&str, &Vec<String>> = teams
        .iter()
        .map(|t| (t.id.as_str(), &t.participants))
        .collect();
    for seat in &assignments {
        if let Some(participants) = rosters.get(seat.team_id.as_str()) {
            state.notifier.notify(
                kinds::SEATS_ASSIGNED,
                (*participants).clone(),
                json!({
                    "teamId": seat.team_id,
                    "teamSite": seat.team_site,
                    "teamSeat": seat.team_seat,
                }),
            );
        }
    }

    success(assignments)
}

/// GET /api/sites/:id/seating - Last committed seat map for a site.
pub async fn get_seating(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> ApiResult<Vec<SeatAssignment>> {
    if state.repo.get_site(&site_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Site {} not found", site_id)));
    }

    let assignments = state.repo.list_seat_assignments(&site_id).await?;
    success(assignments)
}
