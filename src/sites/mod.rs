//! Site assignment engine.
//!
//! Validates site choices against capacity and university configuration.
//! The headroom check on a site-change request is a pre-check only; capacity
//! is actually reserved at approval time so pending requests never hold
//! seats.

use std::sync::Arc;

use crate::capacity::CapacityLedger;
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{CreateSiteRequest, Site};

/// Assigns and validates competition sites.
#[derive(Clone)]
pub struct SiteEngine {
    repo: Arc<Repository>,
    ledger: Arc<CapacityLedger>,
}

impl SiteEngine {
    pub fn new(repo: Arc<Repository>, ledger: Arc<CapacityLedger>) -> Self {
        Self { repo, ledger }
    }

    /// Create a site, rejecting duplicate names within the competition.
    pub async fn create_site(
        &self,
        competition_id: &str,
        request: &CreateSiteRequest,
    ) -> Result<Site, AppError> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Site name is required".to_string()));
        }
        if request.capacity < 0 {
            return Err(AppError::Validation(
                "Capacity must be non-negative".to_string(),
            ));
        }
        if self
            .repo
            .site_name_exists(competition_id, &request.name, None)
            .await?
        {
            return Err(AppError::DuplicateSiteName(format!(
                "A site named \"{}\" already exists in this competition",
                request.name
            )));
        }

        self.repo
            .create_site(competition_id, &request.name, request.capacity)
            .await
    }

    /// Rename a site, rejecting duplicate names within its competition.
    pub async fn rename_site(&self, site_id: &str, new_name: &str) -> Result<Site, AppError> {
        if new_name.trim().is_empty() {
            return Err(AppError::Validation("Site name is required".to_string()));
        }

        let site = self
            .repo
            .get_site(site_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Site {} not found", site_id)))?;

        if self
            .repo
            .site_name_exists(&site.competition_id, new_name, Some(site_id))
            .await?
        {
            return Err(AppError::DuplicateSiteName(format!(
                "A site named \"{}\" already exists in this competition",
                new_name
            )));
        }

        self.repo.rename_site(site_id, new_name).await?;
        Ok(Site {
            name: new_name.to_string(),
            ..site
        })
    }

    /// Look up the pre-configured default site for a university.
    pub async fn default_site(
        &self,
        competition_id: &str,
        university_id: &str,
    ) -> Result<String, AppError> {
        self.repo
            .get_default_site(competition_id, university_id)
            .await?
            .ok_or_else(|| {
                AppError::NoDefaultSite(format!(
                    "No default site configured for university {} in competition {}",
                    university_id, competition_id
                ))
            })
    }

    /// Pre-check that a site has headroom for one more team.
    pub async fn validate_site_change(&self, new_site_id: &str) -> Result<(), AppError> {
        let snapshot = self.ledger.capacity_of(new_site_id).await?;
        if snapshot.headroom() < 1 {
            return Err(AppError::CapacityExceeded(format!(
                "Site {} is full ({}/{} teams)",
                new_site_id, snapshot.occupied, snapshot.capacity
            )));
        }
        Ok(())
    }
}
