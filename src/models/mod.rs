// scoreboard-service/src/models/mod.rs
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Team models
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub join_code: String,
    // Days between automatic point resets; 0 means never
    pub reset_interval_days: u32,
    pub created_at: DateTime<Utc>,
}

// Audit record for the most recent point mutation.
// For add_points `amount` is the applied delta; for set_points it carries
// the new absolute total under the same field name (kept as-is from the
// data this service replaces).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PointChange {
    pub timestamp: DateTime<Utc>,
    pub amount: i64,
}

// One membership record per (team, user)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Membership {
    pub team_id: String,
    pub user_id: String,
    pub display_name: String,
    pub points: i64,
    pub joined_at: DateTime<Utc>,
    pub last_point_change: Option<PointChange>,
}

// Join-code mapping, stored separately so codes can be resolved without
// scanning every team
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JoinCode {
    pub code: String,
    pub team_id: String,
}

// Request bodies
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reset_interval_days: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JoinTeamRequest {
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddPointsRequest {
    pub amount: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SetPointsRequest {
    pub points: i64,
}

// A team together with its leaderboard (members sorted by points, highest
// first; ties keep join order)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamSnapshot {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<Membership>,
}

// Summary shown on the team info sheet
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamStats {
    pub team_id: String,
    pub name: String,
    pub member_count: usize,
    pub total_points: i64,
    pub join_code: String,
    pub top_performer: Option<Membership>,
}

// Events pushed to watchers of a team
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TeamEvent {
    Snapshot(TeamSnapshot),
    Deleted,
    Unavailable { message: String },
}

// JWT claims issued by the external identity provider
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,  // Subject (user ID)
    pub email: String,
    pub name: Option<String>, // Display name, if the provider supplies one
    pub exp: usize,   // Expiration time
    pub iat: usize,   // Issued at
}

// Custom error types
#[derive(Debug)]
pub enum ServiceError {
    Validation(String),
    Unauthorized,
    NotFound,
    NotMember,
    AlreadyMember,
    OwnerCannotLeave,
    NotAuthorized,
    CodeSpaceExhausted,
    PartialFailure(String),
    BackendUnavailable(String),
}

// Implement Display for ServiceError
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::Validation(msg) => write!(f, "Validation: {}", msg),
            ServiceError::Unauthorized => write!(f, "Unauthorized"),
            ServiceError::NotFound => write!(f, "Not Found"),
            ServiceError::NotMember => write!(f, "Not a member of this team"),
            ServiceError::AlreadyMember => write!(f, "Already a member of this team"),
            ServiceError::OwnerCannotLeave => write!(f, "The team owner cannot leave the team"),
            ServiceError::NotAuthorized => write!(f, "Not authorized to perform this action"),
            ServiceError::CodeSpaceExhausted => write!(f, "Could not allocate a unique join code"),
            ServiceError::PartialFailure(msg) => write!(f, "Partial failure: {}", msg),
            ServiceError::BackendUnavailable(msg) => write!(f, "Backend unavailable: {}", msg),
        }
    }
}

// Implement std::error::Error for ServiceError
impl std::error::Error for ServiceError {}

// Implement ResponseError for ServiceError
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Validation(ref message) =>
                HttpResponse::BadRequest().json(message),
            ServiceError::Unauthorized =>
                HttpResponse::Unauthorized().json("Unauthorized"),
            ServiceError::NotFound =>
                HttpResponse::NotFound().json("Not Found"),
            ServiceError::NotMember =>
                HttpResponse::NotFound().json("Not a member of this team"),
            ServiceError::AlreadyMember =>
                HttpResponse::Conflict().json("Already a member of this team"),
            ServiceError::OwnerCannotLeave =>
                HttpResponse::Conflict().json("The team owner cannot leave the team"),
            ServiceError::NotAuthorized =>
                HttpResponse::Forbidden().json("Not authorized to perform this action"),
            ServiceError::CodeSpaceExhausted =>
                HttpResponse::ServiceUnavailable().json("Could not allocate a unique join code"),
            ServiceError::PartialFailure(ref message) =>
                HttpResponse::InternalServerError().json(message),
            ServiceError::BackendUnavailable(ref message) =>
                HttpResponse::ServiceUnavailable().json(message),
        }
    }
}
