// src/handlers/review.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::review::{CreateReviewRequest, ReviewView, UpdateReviewRequest},
    utils::{html::clean_html, jwt::Claims},
};

const REVIEW_VIEW_QUERY: &str = r#"
    SELECT r.id, r.user_id, (ru.first_name || ' ' || ru.last_name) AS reviewer_name,
           r.trip_id, r.rating, r.comment
    FROM reviews r
    JOIN users ru ON r.reviewer_id = ru.id
"#;

async fn is_trip_participant(pool: &PgPool, user_id: i64, trip_id: i64) -> Result<bool, AppError> {
    let is_participant = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM trip_participants WHERE user_id = $1 AND trip_id = $2)",
    )
    .bind(user_id)
    .bind(trip_id)
    .fetch_one(pool)
    .await?;

    Ok(is_participant)
}

/// Create a review. The reviewer is always the caller; both the reviewer and
/// the reviewed user must have participated in the trip.
pub async fn create_review(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let reviewer_id = claims.user_id();

    if payload.user == reviewer_id {
        return Err(AppError::BadRequest(
            "Users cannot review themselves".to_string(),
        ));
    }

    if !is_trip_participant(&pool, payload.user, payload.trip).await? {
        return Err(AppError::BadRequest(
            "The specified user did not participate in the trip".to_string(),
        ));
    }

    if !is_trip_participant(&pool, reviewer_id, payload.trip).await? {
        return Err(AppError::BadRequest(
            "The reviewer did not participate in the trip".to_string(),
        ));
    }

    let already_reviewed = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND trip_id = $2 AND reviewer_id = $3)",
    )
    .bind(payload.user)
    .bind(payload.trip)
    .bind(reviewer_id)
    .fetch_one(&pool)
    .await?;

    if already_reviewed {
        return Err(AppError::BadRequest(
            "A review for this user and trip already exists".to_string(),
        ));
    }

    let comment = payload.comment.as_deref().map(clean_html).unwrap_or_default();

    let review_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO reviews (user_id, reviewer_id, trip_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(payload.user)
    .bind(reviewer_id)
    .bind(payload.trip)
    .bind(payload.rating)
    .bind(&comment)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("A review for this user and trip already exists".to_string())
        } else {
            tracing::error!("Failed to create review: {:?}", e);
            AppError::from(e)
        }
    })?;

    let view = sqlx::query_as::<_, ReviewView>(&format!("{REVIEW_VIEW_QUERY} WHERE r.id = $1"))
        .bind(review_id)
        .fetch_one(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// List all reviews. The reviewer id is hidden behind a display name.
pub async fn list_reviews(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let reviews = sqlx::query_as::<_, ReviewView>(&format!("{REVIEW_VIEW_QUERY} ORDER BY r.id"))
        .fetch_all(&pool)
        .await?;

    Ok(Json(reviews))
}

/// Retrieve a single review.
pub async fn get_review(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let review = sqlx::query_as::<_, ReviewView>(&format!("{REVIEW_VIEW_QUERY} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Review not found".to_string()))?;

    Ok(Json(review))
}

/// Edit one of the caller's reviews; only rating and comment may change.
pub async fn update_review(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE reviews SET
            rating = COALESCE($3, rating),
            comment = COALESCE($4, comment)
        WHERE id = $1 AND reviewer_id = $2
        "#,
    )
    .bind(id)
    .bind(claims.user_id())
    .bind(payload.rating)
    .bind(payload.comment.as_deref().map(clean_html))
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Review not found".to_string()));
    }

    let view = sqlx::query_as::<_, ReviewView>(&format!("{REVIEW_VIEW_QUERY} WHERE r.id = $1"))
        .bind(id)
        .fetch_one(&pool)
        .await?;

    Ok(Json(view))
}

/// Remove one of the caller's reviews.
pub async fn delete_review(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND reviewer_id = $2")
        .bind(id)
        .bind(claims.user_id())
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Review not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
