// src/models/geo.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'states' table in the database.
/// (name, abbreviation, country) is unique; rows are seeded outside the API.
#[derive(Debug, Clone, FromRow)]
pub struct State {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
    pub country: String,
}

/// Represents the 'cities' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub state_id: i64,
}

/// API shape for a state. The country is kept internal.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
}

/// Joined row used to build `CityView` in a single query.
#[derive(Debug, FromRow)]
pub struct CityRow {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub state_id: i64,
    pub state_name: String,
    pub state_abbreviation: String,
}

/// API shape for a city, with its state nested.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityView {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub state: StateView,
}

impl From<CityRow> for CityView {
    fn from(row: CityRow) -> Self {
        CityView {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            state: StateView {
                id: row.state_id,
                name: row.state_name,
                abbreviation: row.state_abbreviation,
            },
        }
    }
}

/// Shape of the optional GEO_SEED_PATH file loaded at startup.
#[derive(Debug, Deserialize)]
pub struct GeoSeed {
    pub states: Vec<SeedState>,
}

#[derive(Debug, Deserialize)]
pub struct SeedState {
    pub name: String,
    pub abbreviation: String,
    pub country: String,
    #[serde(default)]
    pub cities: Vec<SeedCity>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}
