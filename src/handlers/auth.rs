// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RefreshRequest, User},
    utils::{
        hash::verify_password,
        jwt::{TOKEN_USE_ACCESS, TOKEN_USE_REFRESH, sign_jwt, verify_jwt},
    },
};

/// Authenticates a user and returns an access/refresh token pair.
///
/// Verifies the email and password against the database.
/// The access token is short-lived; the refresh token is only valid at the
/// refresh endpoint.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, first_name, last_name, birth_date, about_me,
               document_number, phone_number, profile_picture, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&payload.email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError("User not found".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let access = sign_jwt(
        user.id,
        TOKEN_USE_ACCESS,
        &config.jwt_secret,
        config.access_token_expiration,
    )?;
    let refresh = sign_jwt(
        user.id,
        TOKEN_USE_REFRESH,
        &config.jwt_secret,
        config.refresh_token_expiration,
    )?;

    Ok(Json(json!({
        "access": access,
        "refresh": refresh,
        "tokenType": "Bearer"
    })))
}

/// Exchanges a valid refresh token for a fresh access token.
pub async fn refresh(
    State(config): State<Config>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = verify_jwt(&payload.refresh, &config.jwt_secret)?;

    if claims.token_use != TOKEN_USE_REFRESH {
        return Err(AppError::AuthError("Invalid token".to_string()));
    }

    let access = sign_jwt(
        claims.user_id(),
        TOKEN_USE_ACCESS,
        &config.jwt_secret,
        config.access_token_expiration,
    )?;

    Ok(Json(json!({
        "access": access,
        "tokenType": "Bearer"
    })))
}
