// src/handlers/participant.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::participant::{ParticipantDetail, ParticipantView},
    utils::jwt::Claims,
};

/// List all trip participants with the overview shape.
pub async fn list_participants(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let participants = sqlx::query_as::<_, ParticipantView>(
        r#"
        SELECT tp.id, u.first_name AS user_first_name, tp.role, tp.trip_id
        FROM trip_participants tp
        JOIN users u ON tp.user_id = u.id
        ORDER BY tp.id
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(participants))
}

/// Direct participant creation is forbidden: the only sanctioned ways to
/// become a participant are creating a trip (driver) or having a join
/// request accepted (passenger).
pub async fn create_participant(
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    Err::<StatusCode, _>(AppError::Forbidden(
        "Participants cannot be created directly; join a trip through a join request".to_string(),
    ))
}

/// Retrieve one of the caller's own participations.
pub async fn get_participant(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let participant = sqlx::query_as::<_, ParticipantDetail>(
        "SELECT id, trip_id, role FROM trip_participants WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Participant not found".to_string()))?;

    Ok(Json(participant))
}

/// Participant rows are immutable; role changes are forbidden.
pub async fn update_participant(
    Extension(_claims): Extension<Claims>,
    Path(_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Err::<StatusCode, _>(AppError::Forbidden(
        "Participants cannot be updated, only created or removed".to_string(),
    ))
}

/// Leave a trip: a user may only remove their own participation.
pub async fn delete_participant(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM trip_participants WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(claims.user_id())
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Participant not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
