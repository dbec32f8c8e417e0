// src/models/vehicle.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'vehicles' table in the database.
/// (license_plate, owner_id) is unique together.
#[derive(Debug, Clone, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub owner_id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// List shape, safe to show to any authenticated user.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: i64,
    pub brand: String,
    pub model: String,
}

/// Detail shape for the owner. The owner id itself is implicit from the
/// caller's identity and never exposed.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
}

/// DTO for registering a vehicle. The owner is always the caller.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(custom(function = validate_license_plate))]
    pub license_plate: String,

    #[validate(length(min = 1, max = 50, message = "Brand is required."))]
    pub brand: String,

    #[validate(length(min = 1, max = 50, message = "Model is required."))]
    pub model: String,
}

/// DTO for vehicle updates; absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[validate(custom(function = validate_license_plate))]
    pub license_plate: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,
}

/// Plates come in two formats: ABC123 or AB123CD.
static LICENSE_PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z]{3}\d{3}|[A-Z]{2}\d{3}[A-Z]{2})$").unwrap());

fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_PLATE_RE.is_match(value) {
        return Err(ValidationError::new("invalid_license_plate"));
    }
    Ok(())
}
