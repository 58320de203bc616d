//! User/university directory.
//!
//! Narrow read-only lookup interface the core uses to authorize operations.
//! Backed by the same store as the rest of the service, but nothing outside
//! this module queries user rows for authorization decisions.

use std::sync::Arc;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::User;

/// Read-only user/university lookups.
#[derive(Clone)]
pub struct Directory {
    repo: Arc<Repository>,
}

impl Directory {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Look up a user, failing with NotFound if the id is unknown.
    pub async fn user(&self, user_id: &str) -> Result<User, AppError> {
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// University a user is affiliated with.
    pub async fn university_of(&self, user_id: &str) -> Result<String, AppError> {
        self.user(user_id).await?.university_id.ok_or_else(|| {
            AppError::Validation(format!("User {} has no university affiliation", user_id))
        })
    }
}
