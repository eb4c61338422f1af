//! HTTP API - axum router over the shared database

pub mod exercises;
pub mod extract;
pub mod routines;
pub mod selections;
pub mod users;
pub mod workouts;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::db::Database;
use crate::error::ApiError;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub per_group: usize,
}

impl AppState {
    pub fn new(db: Database, per_group: usize) -> Self {
        Self { db: Arc::new(Mutex::new(db)), per_group }
    }
}

/// `?user_id=` on collection routes
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i64,
}

/// `?limit=` on history routes
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

/// `?day_number=` on next-workout routes
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day_number: Option<u32>,
}

fn require_user(db: &Database, user_id: i64) -> Result<(), ApiError> {
    if db.user_exists(user_id)? {
        Ok(())
    } else {
        Err(ApiError::not_found("User"))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/profile/{user_id}", get(users::get_profile).put(users::update_profile))
        .route("/exercises", get(exercises::list).post(exercises::create))
        .route("/exercises/{exercise_id}", put(exercises::update).delete(exercises::remove))
        .route("/default-exercises", get(exercises::list_defaults))
        .route("/routines", get(routines::list))
        .route(
            "/routine/{user_id}",
            get(routines::overview).post(routines::save).delete(routines::remove),
        )
        .route("/workout/state/{user_id}", get(workouts::state))
        .route("/workout/complete/{user_id}", post(workouts::complete))
        .route("/workout/logs/{user_id}", get(workouts::logs))
        .route("/workout/sessions/{user_id}", get(workouts::sessions))
        .route("/workout/logs-by-sessions/{user_id}", post(workouts::logs_by_sessions))
        .route("/next-workout/selections/{user_id}", get(selections::list))
        .route("/next-workout/toggle", post(selections::toggle))
        .route("/next-workout/clear/{user_id}", delete(selections::clear))
        .route("/next-workout/generate/{user_id}", post(selections::generate))
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C
pub async fn serve(db: Database, config: &ServerConfig) -> Result<()> {
    let app = router(AppState::new(db, config.per_group))
        .layer(config.cors_layer()?)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Shutting down...");
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "Welcome to the fitness journal API" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    pub fn test_app() -> Router {
        router(AppState::new(Database::open_in_memory().unwrap(), 2))
    }

    /// Send a request and decode the JSON body (`Null` when empty)
    pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    /// Register an account and return its id
    pub async fn register(app: &Router, email: &str) -> i64 {
        let (status, body) = send(
            app,
            "POST",
            "/register",
            Some(json!({ "email": email, "password": "secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let app = test_app();
        let (status, body) = send(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let app = test_app();
        for uri in ["/exercises?user_id=42", "/routine/42", "/workout/state/42", "/next-workout/selections/42"] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body["detail"], "User not found");
        }
    }

    #[tokio::test]
    async fn test_rejected_requests_use_detail() {
        let app = test_app();
        let user_id = register(&app, "ann@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/workout/complete/{}", user_id),
            Some(json!({ "exercises": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("day_number"));

        let (status, body) = send(&app, "GET", &format!("/workout/logs/{}?limit=-1", user_id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, body) = send(&app, "GET", "/profile/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (status, body) = send(&app, "GET", "/exercises", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("user_id"));
    }
}
