//! Per-user completion state: toggle, batch sync, reset, progress reads.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::database::completions;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /completed-problems
pub async fn completed_problems(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<i32>>, ApiError> {
    let ids = completions::completed_ids(&state.pool, &user.uid)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch completed problems"))?;

    Ok(Json(ids))
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(rename = "problemId")]
    problem_id: i32,
    // Historical clients also sent a `userId` field here; identity comes
    // from the verified token now, so any such field is ignored.
}

/// POST /api/toggle-complete
pub async fn toggle_complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<Value>, ApiError> {
    let completed = completions::toggle(&state.pool, &user.uid, request.problem_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to toggle completion"))?;

    Ok(Json(json!({ "completed": completed })))
}

#[derive(Debug, Deserialize)]
pub struct BatchToggleRequest {
    completions: HashMap<String, bool>,
}

/// POST /batch-toggle-complete
///
/// Applies each entry independently; bad keys are skipped, and the response
/// reports counts rather than claiming per-entry verification.
pub async fn batch_toggle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BatchToggleRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = completions::batch_sync(&state.pool, &user.uid, &request.completions)
        .await
        .map_err(|e| ApiError::store(e, "Failed to sync completions"))?;

    Ok(Json(json!({
        "success": true,
        "applied": outcome.applied,
        "skipped": outcome.skipped,
    })))
}

/// POST /reset-progress
pub async fn reset_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let removed = completions::reset(&state.pool, &user.uid)
        .await
        .map_err(|e| ApiError::store(e, "Failed to reset progress"))?;

    tracing::info!("reset {removed} completions for user {}", user.uid);
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// GET /api/roadmap-progress?userId=
///
/// Returns a roadmap -> percent-complete mapping.
pub async fn roadmap_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::bad_request("Missing userId"))?;

    let tallies = completions::roadmap_tallies(&state.pool, &user_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch roadmap progress"))?;

    let mut progress = Map::new();
    for tally in tallies {
        progress.insert(
            tally.roadmap,
            completions::percent(tally.completed, tally.total).into(),
        );
    }

    Ok(Json(progress))
}
