// src/handlers/join_request.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};

use crate::{
    error::{AppError, is_unique_violation},
    handlers::trip::departure_slot_taken,
    models::{
        join_request::{
            CreateJoinRequestRequest, JoinRequestView, ResolveJoinRequestRequest, STATUS_ACCEPTED,
            STATUS_PENDING, STATUS_REJECTED,
        },
        participant::ROLE_PASSENGER,
    },
    utils::jwt::Claims,
};

const VIEW_COLUMNS: &str = "jr.id, jr.user_id, jr.trip_id, jr.status, jr.created_at, jr.updated_at";

/// Ask to join a trip. The requester is always the caller; a new request
/// starts out pending.
pub async fn create_join_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJoinRequestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let creator_id = sqlx::query_scalar::<_, i64>("SELECT creator_id FROM trips WHERE id = $1")
        .bind(payload.trip)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::BadRequest(
            "The specified trip does not exist".to_string(),
        ))?;

    if creator_id == user_id {
        return Err(AppError::BadRequest(
            "The trip creator cannot request to join their own trip".to_string(),
        ));
    }

    let already_requested = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM trip_join_requests WHERE user_id = $1 AND trip_id = $2)",
    )
    .bind(user_id)
    .bind(payload.trip)
    .fetch_one(&pool)
    .await?;

    if already_requested {
        return Err(AppError::BadRequest(
            "A join request for this trip already exists".to_string(),
        ));
    }

    let request = sqlx::query_as::<_, JoinRequestView>(&format!(
        r#"
        INSERT INTO trip_join_requests AS jr (user_id, trip_id)
        VALUES ($1, $2)
        RETURNING {VIEW_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(payload.trip)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("A join request for this trip already exists".to_string())
        } else {
            tracing::error!("Failed to create join request: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List join requests for trips created by the caller.
pub async fn list_join_requests(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let requests = sqlx::query_as::<_, JoinRequestView>(&format!(
        r#"
        SELECT {VIEW_COLUMNS}
        FROM trip_join_requests jr
        JOIN trips t ON jr.trip_id = t.id
        WHERE t.creator_id = $1
        ORDER BY jr.created_at DESC
        "#
    ))
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(requests))
}

/// List join requests for one of the caller's trips.
pub async fn list_trip_join_requests(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(trip_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let requests = sqlx::query_as::<_, JoinRequestView>(&format!(
        r#"
        SELECT {VIEW_COLUMNS}
        FROM trip_join_requests jr
        JOIN trips t ON jr.trip_id = t.id
        WHERE t.creator_id = $1 AND jr.trip_id = $2
        ORDER BY jr.created_at DESC
        "#
    ))
    .bind(claims.user_id())
    .bind(trip_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(requests))
}

/// Retrieve a join request on one of the caller's trips.
pub async fn get_join_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let request = sqlx::query_as::<_, JoinRequestView>(&format!(
        r#"
        SELECT {VIEW_COLUMNS}
        FROM trip_join_requests jr
        JOIN trips t ON jr.trip_id = t.id
        WHERE jr.id = $1 AND t.creator_id = $2
        "#
    ))
    .bind(id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Join request not found".to_string()))?;

    Ok(Json(request))
}

#[derive(Debug, FromRow)]
struct PendingRequestRow {
    user_id: i64,
    trip_id: i64,
    status: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
}

/// Resolve a pending join request: the trip creator accepts or rejects it.
/// Accepting enrolls the requester as a passenger in the same transaction,
/// so a conflicting enrollment rolls the status change back. Rejection is
/// terminal and has no side effect.
pub async fn resolve_join_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<ResolveJoinRequestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.status != STATUS_ACCEPTED && payload.status != STATUS_REJECTED {
        return Err(AppError::BadRequest(
            "The status must be either 'accepted' or 'rejected'".to_string(),
        ));
    }

    let request = sqlx::query_as::<_, PendingRequestRow>(
        r#"
        SELECT jr.user_id, jr.trip_id, jr.status, t.departure_date, t.departure_time
        FROM trip_join_requests jr
        JOIN trips t ON jr.trip_id = t.id
        WHERE jr.id = $1 AND t.creator_id = $2
        "#,
    )
    .bind(id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Join request not found".to_string()))?;

    if request.status != STATUS_PENDING {
        return Err(AppError::BadRequest(
            "The join request has already been resolved".to_string(),
        ));
    }

    if payload.status == STATUS_ACCEPTED
        && departure_slot_taken(
            &pool,
            request.user_id,
            request.departure_date,
            request.departure_time,
            None,
        )
        .await?
    {
        return Err(AppError::BadRequest(
            "The user already has a trip at that departure date and time".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE trip_join_requests SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(&payload.status)
        .execute(&mut *tx)
        .await?;

    if payload.status == STATUS_ACCEPTED {
        sqlx::query("INSERT INTO trip_participants (user_id, trip_id, role) VALUES ($1, $2, $3)")
            .bind(request.user_id)
            .bind(request.trip_id)
            .bind(ROLE_PASSENGER)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(
                        "The user is already a participant of this trip".to_string(),
                    )
                } else {
                    tracing::error!("Failed to enroll passenger: {:?}", e);
                    AppError::from(e)
                }
            })?;
    }

    tx.commit().await?;

    let view = sqlx::query_as::<_, JoinRequestView>(&format!(
        "SELECT {VIEW_COLUMNS} FROM trip_join_requests jr WHERE jr.id = $1"
    ))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(view))
}

/// Remove a join request on one of the caller's trips.
pub async fn delete_join_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM trip_join_requests jr
        USING trips t
        WHERE jr.trip_id = t.id AND jr.id = $1 AND t.creator_id = $2
        "#,
    )
    .bind(id)
    .bind(claims.user_id())
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Join request not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
