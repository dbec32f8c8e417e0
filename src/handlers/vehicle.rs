// src/handlers/vehicle.rs

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
    models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest, VehicleDetail, VehicleSummary},
    utils::{jwt::Claims, text::title_case},
};

/// Register a vehicle. The owner is always the authenticated caller.
pub async fn create_vehicle(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let owner_id = claims.user_id();

    // Pre-check for a friendlier message; the composite unique index settles races.
    let already_registered = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM vehicles WHERE owner_id = $1 AND license_plate = $2)",
    )
    .bind(owner_id)
    .bind(&payload.license_plate)
    .fetch_one(&pool)
    .await?;

    if already_registered {
        return Err(AppError::BadRequest(
            "The user already has a vehicle registered with that license plate".to_string(),
        ));
    }

    let vehicle = sqlx::query_as::<_, VehicleDetail>(
        r#"
        INSERT INTO vehicles (owner_id, license_plate, brand, model)
        VALUES ($1, $2, $3, $4)
        RETURNING id, license_plate, brand, model
        "#,
    )
    .bind(owner_id)
    .bind(&payload.license_plate)
    .bind(title_case(&payload.brand))
    .bind(title_case(&payload.model))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(
                "The user already has a vehicle registered with that license plate".to_string(),
            )
        } else {
            tracing::error!("Failed to create vehicle: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// List all vehicles with the minimal shape (no plates, no owners).
pub async fn list_vehicles(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let vehicles = sqlx::query_as::<_, VehicleSummary>(
        "SELECT id, brand, model FROM vehicles ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(vehicles))
}

/// Retrieve one of the caller's vehicles. Other owners' vehicles answer 404.
pub async fn get_vehicle(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let vehicle = sqlx::query_as::<_, VehicleDetail>(
        "SELECT id, license_plate, brand, model FROM vehicles WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Vehicle not found".to_string()))?;

    Ok(Json(vehicle))
}

/// Update one of the caller's vehicles. Absent fields are left untouched.
pub async fn update_vehicle(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let owner_id = claims.user_id();

    let current = sqlx::query_as::<_, VehicleDetail>(
        "SELECT id, license_plate, brand, model FROM vehicles WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Vehicle not found".to_string()))?;

    if let Some(plate) = &payload.license_plate {
        if *plate != current.license_plate {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM vehicles WHERE owner_id = $1 AND license_plate = $2 AND id <> $3)",
            )
            .bind(owner_id)
            .bind(plate)
            .bind(id)
            .fetch_one(&pool)
            .await?;

            if taken {
                return Err(AppError::BadRequest(
                    "The user already has a vehicle registered with that license plate".to_string(),
                ));
            }
        }
    }

    let vehicle = sqlx::query_as::<_, VehicleDetail>(
        r#"
        UPDATE vehicles SET
            license_plate = COALESCE($3, license_plate),
            brand = COALESCE($4, brand),
            model = COALESCE($5, model)
        WHERE id = $1 AND owner_id = $2
        RETURNING id, license_plate, brand, model
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(&payload.license_plate)
    .bind(payload.brand.as_deref().map(title_case))
    .bind(payload.model.as_deref().map(title_case))
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(
                "The user already has a vehicle registered with that license plate".to_string(),
            )
        } else {
            AppError::from(e)
        }
    })?
    .ok_or(AppError::NotFound("Vehicle not found".to_string()))?;

    Ok(Json(vehicle))
}

/// Remove one of the caller's vehicles. Trips referencing it keep running
/// with a null vehicle (ON DELETE SET NULL).
pub async fn delete_vehicle(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM vehicles WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(claims.user_id())
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Vehicle not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
