//! Workout state, completion and history handlers

use axum::extract::State;
use chrono::Local;
use serde::Deserialize;

use super::extract::{Json, Path, Query};
use super::{AppState, LimitQuery, require_user};
use crate::db::workouts::{DEFAULT_LOG_LIMIT, DEFAULT_SESSION_LIMIT};
use crate::db::{CompleteWorkout, CompletedWorkout, WorkoutLog, WorkoutSession, WorkoutState};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SessionIds {
    #[serde(default)]
    pub session_ids: Vec<i64>,
}

pub async fn state(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<WorkoutState>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, user_id)?;
    Ok(Json(db.workout_state(user_id)?))
}

pub async fn complete(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(workout): Json<CompleteWorkout>,
) -> Result<Json<CompletedWorkout>, ApiError> {
    let today = Local::now().date_naive();
    let mut db = state.db.lock().await;
    Ok(Json(db.complete_workout(user_id, &workout, today)?))
}

pub async fn logs(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<WorkoutLog>>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, user_id)?;
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    Ok(Json(db.recent_logs(user_id, limit)?))
}

pub async fn sessions(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<WorkoutSession>>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, user_id)?;
    let limit = query.limit.unwrap_or(DEFAULT_SESSION_LIMIT);
    Ok(Json(db.recent_sessions(user_id, limit)?))
}

pub async fn logs_by_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<SessionIds>,
) -> Result<Json<Vec<WorkoutLog>>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, user_id)?;
    Ok(Json(db.logs_for_sessions(user_id, &body.session_ids)?))
}
