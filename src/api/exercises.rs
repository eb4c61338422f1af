//! Exercise catalog and per-user exercise handlers

use axum::extract::State;
use axum::http::StatusCode;

use super::extract::{Json, Path, Query};
use super::{AppState, UserQuery, require_user};
use crate::db::{DefaultExercise, Exercise, ExerciseInput};
use crate::error::ApiError;

pub async fn list_defaults(State(state): State<AppState>) -> Result<Json<Vec<DefaultExercise>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(db.list_default_exercises()?))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, query.user_id)?;
    Ok(Json(db.list_exercises(query.user_id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(input): Json<ExerciseInput>,
) -> Result<(StatusCode, Json<Exercise>), ApiError> {
    input.validate().map_err(ApiError::bad_request)?;

    let db = state.db.lock().await;
    require_user(&db, query.user_id)?;
    let exercise = db.create_exercise(query.user_id, &input)?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(exercise_id): Path<i64>,
    Query(query): Query<UserQuery>,
    Json(input): Json<ExerciseInput>,
) -> Result<Json<Exercise>, ApiError> {
    input.validate().map_err(ApiError::bad_request)?;

    let db = state.db.lock().await;
    let exercise = db
        .update_exercise(query.user_id, exercise_id, &input)?
        .ok_or_else(|| ApiError::not_found("Exercise"))?;
    Ok(Json(exercise))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(exercise_id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    let db = state.db.lock().await;
    if db.delete_exercise(query.user_id, exercise_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Exercise"))
    }
}
