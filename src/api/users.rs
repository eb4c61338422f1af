//! Registration, login and profile handlers

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AppState;
use super::extract::{Json, Path};
use crate::auth::{hash_password, normalize_email, verify_password};
use crate::db::{ProfileUpdate, User};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub email: String,
    pub message: &'static str,
}

pub async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let email = normalize_email(&credentials.email)
        .ok_or_else(|| ApiError::bad_request("Invalid email address"))?;
    if credentials.password.is_empty() {
        return Err(ApiError::bad_request("Password must not be empty"));
    }

    let password = credentials.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")??;

    let mut db = state.db.lock().await;
    if db.find_user_by_email(&email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }
    let user = db.create_user(&email, &password_hash)?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let email = normalize_email(&credentials.email).ok_or_else(invalid)?;
    let user = {
        let db = state.db.lock().await;
        db.find_user_by_email(&email)?
    };
    let Some(user) = user else {
        warn!("Login attempt for unknown email {}", email);
        return Err(invalid());
    };

    let hash = user.password_hash.clone();
    let password = credentials.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("Password verification task failed")?;
    if !verified {
        warn!("Wrong password for user {}", user.id);
        return Err(invalid());
    }
    if !user.is_active {
        warn!("Login attempt for disabled user {}", user.id);
        return Err(ApiError::Forbidden("Account is disabled".to_string()));
    }

    Ok(Json(LoginResponse { user_id: user.id, email: user.email, message: "Login successful" }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let db = state.db.lock().await;
    let user = db.get_user(user_id)?.ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    update.validate().map_err(ApiError::bad_request)?;

    let db = state.db.lock().await;
    let user = db
        .update_profile(user_id, &update)?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(user))
}
