//! Error types - flow failures and their HTTP mapping

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures of the workout completion and next-workout generation flows
#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error("User not found")]
    UserNotFound,
    #[error("No routine set up")]
    NoRoutine,
    #[error("Day {day} is outside the routine (1-{days_per_week})")]
    DayOutOfRange { day: u32, days_per_week: u32 },
    #[error("No workout state found")]
    NoWorkoutState,
    #[error("No muscle groups assigned to this day")]
    NoMuscleGroups,
    #[error("Exercise {0} not found")]
    ExerciseNotFound(i64),
    #[error("{0}")]
    InvalidEntry(String),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

/// Error returned by HTTP handlers, rendered as `{"detail": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    /// Request body, query or path that could not be extracted
    #[error("{1}")]
    Rejected(StatusCode, String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Rejected(status, _) => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WorkoutError> for ApiError {
    fn from(err: WorkoutError) -> Self {
        let message = err.to_string();
        match err {
            WorkoutError::UserNotFound | WorkoutError::ExerciseNotFound(_) => {
                ApiError::NotFound(message)
            }
            WorkoutError::NoRoutine
            | WorkoutError::DayOutOfRange { .. }
            | WorkoutError::NoWorkoutState
            | WorkoutError::NoMuscleGroups
            | WorkoutError::InvalidEntry(_) => ApiError::BadRequest(message),
            WorkoutError::Storage(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
