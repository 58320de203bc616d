//! User, university and competition models.
//!
//! These back the directory interface the core consults for roles and
//! university affiliation. The service owns just enough of them to make the
//! registration workflow self-contained.

use serde::{Deserialize, Serialize};

/// Role a user holds platform-wide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Coach,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Coach => "coach",
            Role::Staff => "staff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "coach" => Some(Role::Coach),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// A registered platform user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_id: Option<String>,
    pub created_at: String,
}

/// Request body for creating a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub university_id: Option<String>,
}

/// A university participating in competitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// Request body for creating a university.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUniversityRequest {
    pub name: String,
}

/// A competition with a fixed team size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: String,
    pub name: String,
    pub team_size: i64,
    pub registration_open: bool,
    pub created_at: String,
}

/// Request body for creating a competition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetitionRequest {
    pub name: String,
    /// Participants per team; defaults to 3.
    #[serde(default)]
    pub team_size: Option<i64>,
}

/// Request body for configuring a university's default site in a competition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDefaultSiteRequest {
    pub university_id: String,
    pub site_id: String,
}
