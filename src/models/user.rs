// src/models/user.rs

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,

    /// Unique email, used as the login identifier.
    pub email: String,

    /// Argon2 password hash. Never serialized out.
    pub password: String,

    pub first_name: String,
    pub last_name: String,

    pub birth_date: Option<NaiveDate>,
    pub about_me: String,

    /// 8-digit national document number.
    pub document_number: String,

    pub phone_number: String,

    /// Relative path of the uploaded profile picture, if any.
    pub profile_picture: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// List shape: the only user fields other callers may see.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Detail shape for the user's own profile. Password stays internal.
/// `rating` is the average of received review ratings, present only once the
/// user has more than 20 reviews.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub about_me: String,
    pub document_number: String,
    pub phone_number: String,
    pub profile_picture: Option<String>,
    pub rating: Option<f64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl UserDetail {
    pub fn from_user(user: User, rating: Option<f64>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
            about_me: user.about_me,
            document_number: user.document_number,
            phone_number: user.phone_number,
            profile_picture: user.profile_picture,
            rating,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,

    #[validate(length(min = 1, max = 150, message = "First name is required."))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150, message = "Last name is required."))]
    pub last_name: String,

    #[validate(custom(function = validate_birth_date))]
    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 500, message = "About me cannot exceed 500 characters."))]
    #[serde(default)]
    pub about_me: Option<String>,

    #[validate(custom(function = validate_document_number))]
    pub document_number: String,

    #[validate(custom(function = validate_phone_number))]
    pub phone_number: String,
}

/// DTO for self-service profile updates. Absent fields are left untouched,
/// so PUT and PATCH share it.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address."))]
    pub email: Option<String>,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: Option<String>,

    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,

    #[validate(custom(function = validate_birth_date))]
    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 500, message = "About me cannot exceed 500 characters."))]
    pub about_me: Option<String>,

    #[validate(custom(function = validate_document_number))]
    pub document_number: Option<String>,

    #[validate(custom(function = validate_phone_number))]
    pub phone_number: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for refreshing an access token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh: String,
}

static PHONE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{6,15}$").unwrap());

/// Document numbers are exactly 8 digits and strictly positive.
fn validate_document_number(value: &str) -> Result<(), ValidationError> {
    if value.len() != 8
        || !value.chars().all(|c| c.is_ascii_digit())
        || value.parse::<u32>().map_or(true, |n| n == 0)
    {
        return Err(ValidationError::new("invalid_document_number"));
    }
    Ok(())
}

fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    if !PHONE_NUMBER_RE.is_match(value) {
        return Err(ValidationError::new("invalid_phone_number"));
    }
    Ok(())
}

/// Users must be between 18 and 100 years old.
fn validate_birth_date(value: &NaiveDate) -> Result<(), ValidationError> {
    let today = chrono::Utc::now().date_naive();
    match today.years_since(*value) {
        Some(age) if (18..=100).contains(&age) => Ok(()),
        _ => Err(ValidationError::new("invalid_birth_date")),
    }
}
