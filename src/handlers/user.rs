// src/handlers/user.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{RegisterUserRequest, UpdateUserRequest, User, UserDetail, UserSummary},
    utils::{hash::hash_password, html::clean_html, jwt::Claims, text::capitalize},
};

/// Uploaded pictures are capped at 5MB.
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

const USER_COLUMNS: &str = "id, email, password, first_name, last_name, birth_date, about_me, \
                            document_number, phone_number, profile_picture, created_at";

/// Registers a new user. Open to unauthenticated callers.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the detail view (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;
    let about_me = payload.about_me.as_deref().map(clean_html).unwrap_or_default();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, password, first_name, last_name, birth_date, about_me,
                           document_number, phone_number)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(capitalize(&payload.first_name))
    .bind(capitalize(&payload.last_name))
    .bind(payload.birth_date)
    .bind(&about_me)
    .bind(&payload.document_number)
    .bind(&payload.phone_number)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("The email '{}' is already registered", payload.email))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(UserDetail::from_user(user, None))))
}

/// List all users with the minimal, non-sensitive shape.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, first_name, last_name FROM users ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(users))
}

/// Get a user's full profile. Self-scoped: other ids answer 404.
pub async fn get_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if id != claims.user_id() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let rating = fetch_user_rating(&pool, id).await?;

    Ok(Json(UserDetail::from_user(user, rating)))
}

/// Self-service profile update. Absent fields are left untouched, so the
/// same handler serves PUT and PATCH.
pub async fn update_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if id != claims.user_id() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = match &payload.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            email = COALESCE($2, email),
            password = COALESCE($3, password),
            first_name = COALESCE($4, first_name),
            last_name = COALESCE($5, last_name),
            birth_date = COALESCE($6, birth_date),
            about_me = COALESCE($7, about_me),
            document_number = COALESCE($8, document_number),
            phone_number = COALESCE($9, phone_number)
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(payload.first_name.as_deref().map(capitalize))
    .bind(payload.last_name.as_deref().map(capitalize))
    .bind(payload.birth_date)
    .bind(payload.about_me.as_deref().map(clean_html))
    .bind(&payload.document_number)
    .bind(&payload.phone_number)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("That email is already registered".to_string())
        } else {
            AppError::from(e)
        }
    })?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let rating = fetch_user_rating(&pool, id).await?;

    Ok(Json(UserDetail::from_user(user, rating)))
}

/// Store the caller's profile picture. Multipart field 'picture', 5MB cap.
/// The file lands in the upload directory named after the user's email and
/// is served back under /media.
pub async fn upload_profile_picture(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("picture") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| name.rsplit('.').next().map(str::to_owned))
            .unwrap_or_else(|| "jpg".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if data.is_empty() {
            return Err(AppError::BadRequest("The uploaded image is empty".to_string()));
        }
        if data.len() > MAX_PICTURE_BYTES {
            return Err(AppError::BadRequest(
                "The image cannot exceed 5MB".to_string(),
            ));
        }

        let dir = format!("{}/profile_pictures", config.upload_dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let file_name = format!("{}_profile_picture.{}", email, extension);
        let path = format!("{}/{}", dir, file_name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let relative = format!("profile_pictures/{}", file_name);
        sqlx::query("UPDATE users SET profile_picture = $2 WHERE id = $1")
            .bind(user_id)
            .bind(&relative)
            .execute(&pool)
            .await?;

        return Ok(Json(serde_json::json!({ "profilePicture": relative })));
    }

    Err(AppError::BadRequest(
        "Missing multipart field 'picture'".to_string(),
    ))
}

/// Average of received ratings, rounded to one decimal.
/// Only exposed once the user has more than 20 reviews.
async fn fetch_user_rating(pool: &PgPool, user_id: i64) -> Result<Option<f64>, AppError> {
    let (count, average) = sqlx::query_as::<_, (i64, Option<f64>)>(
        "SELECT COUNT(*), AVG(rating)::FLOAT8 FROM reviews WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    if count > 20 {
        Ok(average.map(|avg| (avg * 10.0).round() / 10.0))
    } else {
        Ok(None)
    }
}
