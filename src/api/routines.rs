//! Weekly routine handlers

use axum::extract::State;
use serde_json::{Value, json};
use tracing::info;

use super::extract::{Json, Path, Query};
use super::{AppState, UserQuery, require_user};
use crate::db::{Routine, RoutineOverview, RoutineSetup};
use crate::error::ApiError;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Routine>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(db.list_routines(query.user_id)?))
}

pub async fn overview(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<RoutineOverview>, ApiError> {
    let db = state.db.lock().await;
    require_user(&db, user_id)?;
    Ok(Json(db.routine_overview(user_id)?))
}

/// Replace the routine and return it as stored
pub async fn save(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(setup): Json<RoutineSetup>,
) -> Result<Json<RoutineOverview>, ApiError> {
    setup.validate().map_err(ApiError::bad_request)?;

    let mut db = state.db.lock().await;
    require_user(&db, user_id)?;
    db.save_routine(user_id, &setup)?;
    Ok(Json(db.routine_overview(user_id)?))
}

/// Remove the routine; succeeds whether or not one was set up
pub async fn remove(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut db = state.db.lock().await;
    require_user(&db, user_id)?;
    if db.delete_routine(user_id)? {
        info!("Deleted routine of user {}", user_id);
    }
    Ok(Json(json!({ "message": "Routine deleted successfully" })))
}
