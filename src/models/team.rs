//! Team and pending-request models.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a team.
///
/// PENDING -> REGISTERED on staff approval; REGISTERED -> PENDING when a
/// member withdrawal drops the roster below the team size; PENDING ->
/// UNREGISTERED when registration closes on an incomplete team (terminal).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Pending,
    Registered,
    Unregistered,
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Pending => "pending",
            TeamStatus::Registered => "registered",
            TeamStatus::Unregistered => "unregistered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TeamStatus::Pending),
            "registered" => Some(TeamStatus::Registered),
            "unregistered" => Some(TeamStatus::Unregistered),
            _ => None,
        }
    }
}

/// Kind of a pending staff-facing change request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Name,
    Site,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Name => "name",
            RequestKind::Site => "site",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "name" => Some(RequestKind::Name),
            "site" => Some(RequestKind::Site),
            _ => None,
        }
    }
}

/// A team of participants registered together under one competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub competition_id: String,
    pub university_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_name: Option<String>,
    pub name_approved: bool,
    pub status: TeamStatus,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_site_id: Option<String>,
    /// Short code teammates use to join this team.
    pub team_code: String,
    /// Ordered roster, capped at `team_size`.
    pub participants: Vec<String>,
    pub team_size: i64,
    pub created_at: String,
}

impl Team {
    pub fn is_full(&self) -> bool {
        self.participants.len() as i64 >= self.team_size
    }
}

/// An uncommitted name or site change awaiting a staff decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub id: String,
    pub team_id: String,
    pub kind: RequestKind,
    pub requested_value: String,
    pub requested_at: String,
}

/// Request body for a student joining a competition individually.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinIndividualRequest {
    pub user_id: String,
    /// Explicit site choice; falls back to the university's default site.
    #[serde(default)]
    pub site_id: Option<String>,
    /// Competition level the team plays at; defaults to "Open".
    #[serde(default)]
    pub level: Option<String>,
    /// Display name for a newly created team.
    #[serde(default)]
    pub team_name: Option<String>,
}

/// Request body for joining an existing team by its code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWithCodeRequest {
    pub user_id: String,
    pub team_code: String,
}

/// Request body for withdrawing a student from a competition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub user_id: String,
}

/// Request body for a team name change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameChangeRequest {
    pub new_name: String,
}

/// Request body for a team site change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteChangeRequest {
    pub new_site_id: String,
}

/// Request body for batch team-assignment approval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveTeamsRequest {
    pub team_ids: Vec<String>,
}

/// Request body for batch approve/reject of name or site changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRequestsRequest {
    #[serde(default)]
    pub approve_ids: Vec<String>,
    #[serde(default)]
    pub reject_ids: Vec<String>,
}

/// Staff view of everything awaiting a decision in one competition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOverview {
    /// Full PENDING teams awaiting assignment approval.
    pub teams_awaiting_approval: Vec<Team>,
    pub name_requests: Vec<PendingRequest>,
    pub site_requests: Vec<PendingRequest>,
}
