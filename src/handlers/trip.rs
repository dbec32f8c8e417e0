// src/handlers/trip.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        participant::{ParticipantView, ROLE_DRIVER},
        trip::{CreateTripRequest, Trip, TripOverview, TripOverviewRow, UpdateTripRequest,
               validate_departure},
    },
    utils::jwt::Claims,
};

const TRIP_OVERVIEW_QUERY: &str = r#"
    SELECT t.id,
           oc.name AS origin_city, os.name AS origin_state,
           dc.name AS destination_city, ds.name AS destination_state,
           t.departure_date, t.departure_time,
           t.pet_allowed, t.smoking_allowed, t.kids_allowed,
           v.id AS vehicle_id, v.brand AS vehicle_brand, v.model AS vehicle_model
    FROM trips t
    JOIN cities oc ON t.origin_city_id = oc.id
    JOIN states os ON oc.state_id = os.id
    JOIN cities dc ON t.destination_city_id = dc.id
    JOIN states ds ON dc.state_id = ds.id
    LEFT JOIN vehicles v ON t.vehicle_id = v.id
"#;

const TRIP_COLUMNS: &str = "id, origin_city_id, destination_city_id, departure_date, \
                            departure_time, pet_allowed, smoking_allowed, kids_allowed, \
                            vehicle_id, creator_id, created_at";

/// Whether the user already participates in any trip departing at exactly
/// this date + time. Used both when creating a trip (the creator becomes its
/// driver) and when accepting a join request (the requester becomes a
/// passenger).
pub async fn departure_slot_taken<'e, E>(
    executor: E,
    user_id: i64,
    date: NaiveDate,
    time: NaiveTime,
    exclude_trip: Option<i64>,
) -> Result<bool, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM trip_participants tp
            JOIN trips t ON tp.trip_id = t.id
            WHERE tp.user_id = $1
              AND t.departure_date = $2
              AND t.departure_time = $3
              AND ($4::BIGINT IS NULL OR t.id <> $4)
        )
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(time)
    .bind(exclude_trip)
    .fetch_one(executor)
    .await?;

    Ok(taken)
}

async fn fetch_participants(
    pool: &PgPool,
    trip_id: i64,
) -> Result<Vec<ParticipantView>, AppError> {
    let participants = sqlx::query_as::<_, ParticipantView>(
        r#"
        SELECT tp.id, u.first_name AS user_first_name, tp.role, tp.trip_id
        FROM trip_participants tp
        JOIN users u ON tp.user_id = u.id
        WHERE tp.trip_id = $1
        ORDER BY tp.id
        "#,
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;

    Ok(participants)
}

async fn fetch_trip_overview(pool: &PgPool, trip_id: i64) -> Result<TripOverview, AppError> {
    let row = sqlx::query_as::<_, TripOverviewRow>(&format!("{TRIP_OVERVIEW_QUERY} WHERE t.id = $1"))
        .bind(trip_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Trip not found".to_string()))?;

    let participants = fetch_participants(pool, trip_id).await?;

    Ok(TripOverview::from_row(row, participants))
}

/// Checks shared by create and update, run against the merged field image.
async fn check_trip_rules(
    pool: &PgPool,
    creator_id: i64,
    origin_city: i64,
    destination_city: i64,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    vehicle: i64,
    exclude_trip: Option<i64>,
) -> Result<(), AppError> {
    if origin_city == destination_city {
        return Err(AppError::BadRequest(
            "The origin and destination cannot be the same city".to_string(),
        ));
    }

    if let Err(msg) = validate_departure(departure_date, departure_time, Utc::now().naive_utc()) {
        return Err(AppError::BadRequest(msg.to_string()));
    }

    let cities_found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cities WHERE id = ANY($1)")
        .bind(vec![origin_city, destination_city])
        .fetch_one(pool)
        .await?;
    if cities_found != 2 {
        return Err(AppError::BadRequest(
            "The specified city does not exist".to_string(),
        ));
    }

    // The driver must own the trip's vehicle.
    let owns_vehicle = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1 AND owner_id = $2)",
    )
    .bind(vehicle)
    .bind(creator_id)
    .fetch_one(pool)
    .await?;
    if !owns_vehicle {
        return Err(AppError::BadRequest(
            "The vehicle does not exist or does not belong to the user".to_string(),
        ));
    }

    if departure_slot_taken(pool, creator_id, departure_date, departure_time, exclude_trip).await? {
        return Err(AppError::BadRequest(
            "The user already has a trip at that departure date and time".to_string(),
        ));
    }

    Ok(())
}

/// Create a trip. The caller becomes the creator and is enrolled as the
/// driver participant in the same transaction: if the participant insert
/// fails, no trip remains behind.
pub async fn create_trip(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let creator_id = claims.user_id();

    check_trip_rules(
        &pool,
        creator_id,
        payload.origin_city,
        payload.destination_city,
        payload.departure_date,
        payload.departure_time,
        payload.vehicle,
        None,
    )
    .await?;

    let mut tx = pool.begin().await?;

    let trip_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO trips (origin_city_id, destination_city_id, departure_date, departure_time,
                           pet_allowed, smoking_allowed, kids_allowed, vehicle_id, creator_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(payload.origin_city)
    .bind(payload.destination_city)
    .bind(payload.departure_date)
    .bind(payload.departure_time)
    .bind(payload.pet_allowed)
    .bind(payload.smoking_allowed)
    .bind(payload.kids_allowed)
    .bind(payload.vehicle)
    .bind(creator_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create trip: {:?}", e);
        AppError::from(e)
    })?;

    sqlx::query("INSERT INTO trip_participants (user_id, trip_id, role) VALUES ($1, $2, $3)")
        .bind(creator_id)
        .bind(trip_id)
        .bind(ROLE_DRIVER)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("The user is already a participant of this trip".to_string())
            } else {
                tracing::error!("Failed to enroll trip creator as driver: {:?}", e);
                AppError::from(e)
            }
        })?;

    tx.commit().await?;

    let overview = fetch_trip_overview(&pool, trip_id).await?;

    Ok((StatusCode::CREATED, Json(overview)))
}

/// List all trips with the overview shape. Open to unauthenticated callers.
pub async fn list_trips(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, TripOverviewRow>(&format!(
        "{TRIP_OVERVIEW_QUERY} ORDER BY t.departure_date, t.departure_time, t.id"
    ))
    .fetch_all(&pool)
    .await?;

    let trip_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let mut by_trip: HashMap<i64, Vec<ParticipantView>> = HashMap::new();
    if !trip_ids.is_empty() {
        let participants = sqlx::query_as::<_, ParticipantView>(
            r#"
            SELECT tp.id, u.first_name AS user_first_name, tp.role, tp.trip_id
            FROM trip_participants tp
            JOIN users u ON tp.user_id = u.id
            WHERE tp.trip_id = ANY($1)
            ORDER BY tp.id
            "#,
        )
        .bind(&trip_ids)
        .fetch_all(&pool)
        .await?;

        for participant in participants {
            by_trip.entry(participant.trip).or_default().push(participant);
        }
    }

    let trips: Vec<TripOverview> = rows
        .into_iter()
        .map(|row| {
            let participants = by_trip.remove(&row.id).unwrap_or_default();
            TripOverview::from_row(row, participants)
        })
        .collect();

    Ok(Json(trips))
}

/// Retrieve a single trip with the overview shape.
pub async fn get_trip(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let overview = fetch_trip_overview(&pool, id).await?;
    Ok(Json(overview))
}

/// Update a trip. Creator-scoped: other callers see 404.
/// The business rules are re-checked against the merged field image.
pub async fn update_trip(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTripRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let creator_id = claims.user_id();

    let current = sqlx::query_as::<_, Trip>(&format!(
        "SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1 AND creator_id = $2"
    ))
    .bind(id)
    .bind(creator_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Trip not found".to_string()))?;

    let origin_city = payload.origin_city.unwrap_or(current.origin_city_id);
    let destination_city = payload
        .destination_city
        .unwrap_or(current.destination_city_id);
    let departure_date = payload.departure_date.unwrap_or(current.departure_date);
    let departure_time = payload.departure_time.unwrap_or(current.departure_time);
    let vehicle = match (payload.vehicle, current.vehicle_id) {
        (Some(vehicle), _) => vehicle,
        (None, Some(vehicle)) => vehicle,
        (None, None) => {
            return Err(AppError::BadRequest("The trip has no vehicle".to_string()));
        }
    };

    check_trip_rules(
        &pool,
        creator_id,
        origin_city,
        destination_city,
        departure_date,
        departure_time,
        vehicle,
        Some(id),
    )
    .await?;

    sqlx::query(
        r#"
        UPDATE trips SET
            origin_city_id = $3,
            destination_city_id = $4,
            departure_date = $5,
            departure_time = $6,
            pet_allowed = COALESCE($7, pet_allowed),
            smoking_allowed = COALESCE($8, smoking_allowed),
            kids_allowed = COALESCE($9, kids_allowed),
            vehicle_id = $10
        WHERE id = $1 AND creator_id = $2
        "#,
    )
    .bind(id)
    .bind(creator_id)
    .bind(origin_city)
    .bind(destination_city)
    .bind(departure_date)
    .bind(departure_time)
    .bind(payload.pet_allowed)
    .bind(payload.smoking_allowed)
    .bind(payload.kids_allowed)
    .bind(vehicle)
    .execute(&pool)
    .await?;

    let overview = fetch_trip_overview(&pool, id).await?;

    Ok(Json(overview))
}

/// Delete a trip. Creator-scoped; participants and join requests cascade.
pub async fn delete_trip(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM trips WHERE id = $1 AND creator_id = $2")
        .bind(id)
        .bind(claims.user_id())
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Trip not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
