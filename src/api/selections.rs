//! Next-workout selection handlers

use axum::extract::State;
use serde_json::{Value, json};

use super::extract::{Json, Path, Query};
use super::{AppState, DayQuery, require_user};
use crate::db::{GeneratedWorkout, Selection, ToggleSelection};
use crate::error::ApiError;

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Selection>>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, user_id)?;
    Ok(Json(db.list_selections(user_id)?))
}

pub async fn toggle(
    State(state): State<AppState>,
    Json(toggle): Json<ToggleSelection>,
) -> Result<Json<Value>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, toggle.user_id)?;
    if !db.toggle_selection(toggle.user_id, toggle.exercise_id, toggle.is_selected)? {
        return Err(ApiError::not_found("Exercise"));
    }
    Ok(Json(json!({ "exercise_id": toggle.exercise_id, "is_selected": toggle.is_selected })))
}

pub async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Value>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, user_id)?;
    let cleared = db.clear_selections(user_id, query.day_number)?;
    Ok(Json(json!({ "cleared": cleared })))
}

pub async fn generate(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DayQuery>,
) -> Result<Json<GeneratedWorkout>, ApiError> {
    let mut db = state.db.lock().await;
    let generated = db.generate_next_workout(user_id, query.day_number, state.per_group)?;
    Ok(Json(generated))
}
