//! User, university and competition endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    Competition, CreateCompetitionRequest, CreateUniversityRequest, CreateUserRequest,
    SetDefaultSiteRequest, University, User,
};
use crate::AppState;

/// POST /api/users - Register a user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    if request.display_name.trim().is_empty() {
        return Err(AppError::Validation("Display name is required".to_string()));
    }

    let user = state.repo.create_user(&request).await?;
    success(user)
}

/// GET /api/users/:id - Get a single user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state
        .repo
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
    success(user)
}

/// POST /api/universities - Create a university.
pub async fn create_university(
    State(state): State<AppState>,
    Json(request): Json<CreateUniversityRequest>,
) -> ApiResult<University> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "University name is required".to_string(),
        ));
    }

    let university = state.repo.create_university(&request).await?;
    success(university)
}

/// GET /api/universities - List all universities.
pub async fn list_universities(State(state): State<AppState>) -> ApiResult<Vec<University>> {
    let universities = state.repo.list_universities().await?;
    success(universities)
}

/// POST /api/competitions - Create a competition.
pub async fn create_competition(
    State(state): State<AppState>,
    Json(request): Json<CreateCompetitionRequest>,
) -> ApiResult<Competition> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Competition name is required".to_string(),
        ));
    }
    if matches!(request.team_size, Some(size) if size < 1) {
        return Err(AppError::Validation(
            "Team size must be at least 1".to_string(),
        ));
    }

    let competition = state.repo.create_competition(&request).await?;
    success(competition)
}

/// GET /api/competitions/:id - Get a competition.
pub async fn get_competition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Competition> {
    let competition = state
        .repo
        .get_competition(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Competition {} not found", id)))?;
    success(competition)
}

/// PUT /api/competitions/:id/default-sites - Configure a university default site.
pub async fn set_default_site(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<SetDefaultSiteRequest>,
) -> ApiResult<()> {
    let site = state
        .repo
        .get_site(&request.site_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Site {} not found", request.site_id)))?;
    if site.competition_id != competition_id {
        return Err(AppError::Validation(
            "Site belongs to a different competition".to_string(),
        ));
    }

    state
        .repo
        .set_default_site(&competition_id, &request.university_id, &request.site_id)
        .await?;
    success(())
}
