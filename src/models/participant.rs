// src/models/participant.rs

use serde::Serialize;
use sqlx::FromRow;

pub const ROLE_DRIVER: &str = "driver";
pub const ROLE_PASSENGER: &str = "passenger";

/// Represents the 'trip_participants' table in the database.
/// (user_id, trip_id) is unique; a partial index allows one driver per trip.
/// Rows are immutable: they are created by trip creation or join-request
/// acceptance and can only be deleted.
#[derive(Debug, Clone, FromRow)]
pub struct TripParticipant {
    pub id: i64,
    pub user_id: i64,
    pub trip_id: i64,
    pub role: String,
}

/// List shape: the participant's user is reduced to a first name.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: i64,
    #[sqlx(rename = "user_first_name")]
    pub user: String,
    pub role: String,
    #[sqlx(rename = "trip_id")]
    pub trip: i64,
}

/// Detail shape for a participant's own row.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetail {
    pub id: i64,
    #[sqlx(rename = "trip_id")]
    pub trip: i64,
    pub role: String,
}
