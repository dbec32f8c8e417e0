// src/models/join_request.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";
pub const STATUS_REJECTED: &str = "rejected";

/// Represents the 'trip_join_requests' table in the database.
/// (user_id, trip_id) is unique together.
#[derive(Debug, Clone, FromRow)]
pub struct TripJoinRequest {
    pub id: i64,
    pub user_id: i64,
    pub trip_id: i64,
    pub status: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for asking to join a trip. The requester is always the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJoinRequestRequest {
    pub trip: i64,
}

/// DTO for the creator's decision on a pending request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveJoinRequestRequest {
    pub status: String,
}

/// API shape for a join request.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestView {
    pub id: i64,
    #[sqlx(rename = "user_id")]
    pub user: i64,
    #[sqlx(rename = "trip_id")]
    pub trip: i64,
    pub status: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
