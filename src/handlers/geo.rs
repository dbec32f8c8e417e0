// src/handlers/geo.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::geo::{CityRow, CityView, StateView},
};

/// Lists all states. Reference data, read-only via the API.
pub async fn list_states(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let states = sqlx::query_as::<_, StateView>(
        "SELECT id, name, abbreviation FROM states ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(states))
}

/// Retrieves a single state by ID.
pub async fn get_state(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let state = sqlx::query_as::<_, StateView>(
        "SELECT id, name, abbreviation FROM states WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("State not found".to_string()))?;

    Ok(Json(state))
}

const CITY_QUERY: &str = r#"
    SELECT c.id, c.name, c.latitude, c.longitude,
           s.id AS state_id, s.name AS state_name, s.abbreviation AS state_abbreviation
    FROM cities c
    JOIN states s ON c.state_id = s.id
"#;

/// Lists all cities with their state nested.
pub async fn list_cities(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let cities = sqlx::query_as::<_, CityRow>(&format!("{CITY_QUERY} ORDER BY c.name"))
        .fetch_all(&pool)
        .await?
        .into_iter()
        .map(CityView::from)
        .collect::<Vec<_>>();

    Ok(Json(cities))
}

/// Retrieves a single city by ID.
pub async fn get_city(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let city = sqlx::query_as::<_, CityRow>(&format!("{CITY_QUERY} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .map(CityView::from)
        .ok_or(AppError::NotFound("City not found".to_string()))?;

    Ok(Json(city))
}
