// src/models/trip.rs

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{participant::ParticipantView, vehicle::VehicleSummary};

/// Represents the 'trips' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Trip {
    pub id: i64,
    pub origin_city_id: i64,
    pub destination_city_id: i64,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub pet_allowed: bool,
    pub smoking_allowed: bool,
    pub kids_allowed: bool,
    /// Nullable: deleting a vehicle keeps its trips (ON DELETE SET NULL).
    pub vehicle_id: Option<i64>,
    pub creator_id: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a trip: flat reference ids only, no nested objects.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub origin_city: i64,
    pub destination_city: i64,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    #[serde(default)]
    pub pet_allowed: bool,
    #[serde(default)]
    pub smoking_allowed: bool,
    #[serde(default)]
    pub kids_allowed: bool,
    pub vehicle: i64,
}

/// DTO for trip updates; absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTripRequest {
    pub origin_city: Option<i64>,
    pub destination_city: Option<i64>,
    pub departure_date: Option<NaiveDate>,
    pub departure_time: Option<NaiveTime>,
    pub pet_allowed: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub kids_allowed: Option<bool>,
    pub vehicle: Option<i64>,
}

/// Joined row for the overview query; participants are attached afterwards.
#[derive(Debug, FromRow)]
pub struct TripOverviewRow {
    pub id: i64,
    pub origin_city: String,
    pub origin_state: String,
    pub destination_city: String,
    pub destination_state: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub pet_allowed: bool,
    pub smoking_allowed: bool,
    pub kids_allowed: bool,
    pub vehicle_id: Option<i64>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
}

/// Overview shape used for both list and retrieve: display strings for the
/// cities, a nested vehicle summary and the participant roster.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripOverview {
    pub id: i64,
    pub origin_city: String,
    pub destination_city: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub pet_allowed: bool,
    pub smoking_allowed: bool,
    pub kids_allowed: bool,
    pub vehicle: Option<VehicleSummary>,
    pub participants: Vec<ParticipantView>,
}

impl TripOverview {
    pub fn from_row(row: TripOverviewRow, participants: Vec<ParticipantView>) -> Self {
        let vehicle = match (row.vehicle_id, row.vehicle_brand, row.vehicle_model) {
            (Some(id), Some(brand), Some(model)) => Some(VehicleSummary { id, brand, model }),
            _ => None,
        };
        TripOverview {
            id: row.id,
            origin_city: format!("{}, {}", row.origin_city, row.origin_state),
            destination_city: format!("{}, {}", row.destination_city, row.destination_state),
            departure_date: row.departure_date,
            departure_time: row.departure_time,
            pet_allowed: row.pet_allowed,
            smoking_allowed: row.smoking_allowed,
            kids_allowed: row.kids_allowed,
            vehicle,
            participants,
        }
    }
}

/// Departure must be strictly in the future and at most one year out.
/// `now` is passed in (UTC wall clock in production) to keep the rule pure.
pub fn validate_departure(
    date: NaiveDate,
    time: NaiveTime,
    now: NaiveDateTime,
) -> Result<(), &'static str> {
    let departure = NaiveDateTime::new(date, time);
    if departure <= now {
        return Err("The departure date cannot be in the past.");
    }
    if departure > now + Duration::days(365) {
        return Err("The departure date cannot be more than one year from now.");
    }
    Ok(())
}
