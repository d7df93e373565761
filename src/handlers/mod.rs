pub mod admin;
pub mod problems;
pub mod progress;
pub mod users;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "CodeDrill API",
        "version": version,
        "description": "Coding-practice catalog with per-user progress tracking",
        "endpoints": {
            "catalog": "/problems, /problems/:id, /problems/roadmap/:roadmap (public)",
            "progress": "/completed-problems, /batch-toggle-complete, /reset-progress (bearer token)",
            "account": "/log-user, /delete-user (bearer token)",
            "admin": "/admin/post, PUT/DELETE /problems/:id (secret key)",
        },
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "ok",
                "timestamp": now,
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "database unavailable",
                    "status": "degraded",
                    "timestamp": now,
                })),
            )
        }
    }
}
