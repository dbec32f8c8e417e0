// src/models/review.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'reviews' table in the database.
/// (user_id, trip_id, reviewer_id) is unique: a participant reviews each
/// fellow participant of a trip at most once.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: i64,
    /// The reviewed user.
    pub user_id: i64,
    pub reviewer_id: i64,
    pub trip_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a review. The reviewer is always the caller.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    /// The reviewed user.
    pub user: i64,
    pub trip: i64,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,

    #[validate(length(max = 1000, message = "Comment cannot exceed 1000 characters."))]
    #[serde(default)]
    pub comment: Option<String>,
}

/// DTO for editing a review; only rating and comment may change.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: Option<i32>,

    #[validate(length(max = 1000, message = "Comment cannot exceed 1000 characters."))]
    pub comment: Option<String>,
}

/// API shape for a review: the reviewer id is hidden behind a display name.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: i64,
    #[sqlx(rename = "user_id")]
    pub user: i64,
    #[sqlx(rename = "reviewer_name")]
    pub reviewer: String,
    #[sqlx(rename = "trip_id")]
    pub trip: i64,
    pub rating: i32,
    pub comment: String,
}
