//! Error handling module for the registration backend.
//!
//! One tagged error type covers the whole workflow: domain rule violations
//! (capacity, pending requests, duplicate names) are distinct variants so the
//! approval pipeline can record them per batch item and keep going, while
//! store failures map to a single infrastructure variant.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const ALREADY_REGISTERED: &str = "ALREADY_REGISTERED";
    pub const INVALID_CODE: &str = "INVALID_CODE";
    pub const TEAM_FULL: &str = "TEAM_FULL";
    pub const REQUEST_ALREADY_PENDING: &str = "REQUEST_ALREADY_PENDING";
    pub const CAPACITY_EXCEEDED: &str = "CAPACITY_EXCEEDED";
    pub const CAPACITY_BELOW_OCCUPIED: &str = "CAPACITY_BELOW_OCCUPIED";
    pub const DUPLICATE_SITE_NAME: &str = "DUPLICATE_SITE_NAME";
    pub const NO_DEFAULT_SITE: &str = "NO_DEFAULT_SITE";
    pub const INSUFFICIENT_SEATS: &str = "INSUFFICIENT_SEATS";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Validation error on an input field
    Validation(String),
    /// Student already holds a role/team in this competition
    AlreadyRegistered(String),
    /// Join code does not resolve to a team
    InvalidCode(String),
    /// Team already has a full roster
    TeamFull(String),
    /// A name/site change request is already outstanding for this team
    RequestAlreadyPending(String),
    /// Reservation would push a site past its seat capacity
    CapacityExceeded(String),
    /// Capacity cannot be lowered below current commitments
    CapacityBelowOccupied(String),
    /// Another site in the competition already carries this name
    DuplicateSiteName(String),
    /// No default site configured for this university/competition pair
    NoDefaultSite(String),
    /// Seat assignment cannot place every registered team
    InsufficientSeats(String),
    /// Database error
    Database(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            AppError::InvalidCode(_) => StatusCode::NOT_FOUND,
            AppError::TeamFull(_) => StatusCode::CONFLICT,
            AppError::RequestAlreadyPending(_) => StatusCode::CONFLICT,
            AppError::CapacityExceeded(_) => StatusCode::CONFLICT,
            AppError::CapacityBelowOccupied(_) => StatusCode::CONFLICT,
            AppError::DuplicateSiteName(_) => StatusCode::CONFLICT,
            AppError::NoDefaultSite(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientSeats(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::AlreadyRegistered(_) => codes::ALREADY_REGISTERED,
            AppError::InvalidCode(_) => codes::INVALID_CODE,
            AppError::TeamFull(_) => codes::TEAM_FULL,
            AppError::RequestAlreadyPending(_) => codes::REQUEST_ALREADY_PENDING,
            AppError::CapacityExceeded(_) => codes::CAPACITY_EXCEEDED,
            AppError::CapacityBelowOccupied(_) => codes::CAPACITY_BELOW_OCCUPIED,
            AppError::DuplicateSiteName(_) => codes::DUPLICATE_SITE_NAME,
            AppError::NoDefaultSite(_) => codes::NO_DEFAULT_SITE,
            AppError::InsufficientSeats(_) => codes::INSUFFICIENT_SEATS,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::AlreadyRegistered(msg)
            | AppError::InvalidCode(msg)
            | AppError::TeamFull(msg)
            | AppError::RequestAlreadyPending(msg)
            | AppError::CapacityExceeded(msg)
            | AppError::CapacityBelowOccupied(msg)
            | AppError::DuplicateSiteName(msg)
            | AppError::NoDefaultSite(msg)
            | AppError::InsufficientSeats(msg)
            | AppError::Database(msg)
            | AppError::BadRequest(msg) => msg.clone(),
        }
    }

    /// True for store/connectivity failures, false for domain rule violations.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, AppError::Database(_))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope and in per-item batch outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetails {
    pub fn from_error(error: &AppError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.message(),
            details: None,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails::from_error(error),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
