//! Site and seat-map endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CapacitySnapshot, CreateLabRequest, CreateSiteRequest, Lab, RenameSiteRequest,
    SetCapacityRequest, Site,
};
use crate::AppState;

/// POST /api/competitions/:id/sites - Create a site.
pub async fn create_site(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<CreateSiteRequest>,
) -> ApiResult<Site> {
    if state.repo.get_competition(&competition_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Competition {} not found",
            competition_id
        )));
    }

    let site = state.sites.create_site(&competition_id, &request).await?;
    success(site)
}

/// GET /api/competitions/:id/sites - List a competition's sites.
pub async fn list_sites(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
) -> ApiResult<Vec<Site>> {
    let sites = state.repo.list_sites(&competition_id).await?;
    success(sites)
}

/// PUT /api/sites/:id/name - Rename a site.
pub async fn rename_site(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RenameSiteRequest>,
) -> ApiResult<Site> {
    let site = state.sites.rename_site(&id, &request.name).await?;
    success(site)
}

/// GET /api/sites/:id/capacity - Capacity snapshot for a site.
pub async fn get_capacity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CapacitySnapshot> {
    let snapshot = state.ledger.capacity_of(&id).await?;
    success(snapshot)
}

/// PUT /api/sites/:id/capacity - Change a site's capacity.
pub async fn set_capacity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetCapacityRequest>,
) -> ApiResult<CapacitySnapshot> {
    state.ledger.set_capacity(&id, request.capacity).await?;
    let snapshot = state.ledger.capacity_of(&id).await?;
    success(snapshot)
}

/// POST /api/sites/:id/labs - Add a lab to a site's seat map.
pub async fn create_lab(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(request): Json<CreateLabRequest>,
) -> ApiResult<Lab> {
    if state.repo.get_site(&site_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Site {} not found", site_id)));
    }
    if request.seat_count < 1 {
        return Err(AppError::Validation(
            "Lab must have at least one seat".to_string(),
        ));
    }
    if matches!(request.seat_skip, Some(skip) if skip < 0) {
        return Err(AppError::Validation(
            "Seat skip must be non-negative".to_string(),
        ));
    }

    let lab = state.repo.create_lab(&site_id, &request).await?;
    success(lab)
}

/// GET /api/sites/:id/labs - List a site's labs in walk order.
pub async fn list_labs(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> ApiResult<Vec<Lab>> {
    let labs = state.repo.list_labs(&site_id).await?;
    success(labs)
}
