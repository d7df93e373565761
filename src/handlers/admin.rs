//! Catalog writes, gated by the shared admin secret.
//!
//! Every payload here has already passed [`AdminGuard`], which strips the
//! secret before deserialization.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::problems::parse_id;
use crate::database::models::{NewProblem, ProblemUpdate};
use crate::database::problems;
use crate::error::ApiError;
use crate::middleware::{AdminGuard, EmptyBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    problem: ProblemUpdate,
}

#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    problem: NewProblem,
}

/// PUT /problems/:id
pub async fn update_problem(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminGuard(request): AdminGuard<UpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    let updated = problems::update(&state.pool, id, &request.problem)
        .await
        .map_err(|e| ApiError::store(e, "Update failed"))?;

    if updated {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ApiError::not_found("Not found"))
    }
}

/// DELETE /problems/:id
pub async fn delete_problem(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AdminGuard(_): AdminGuard<EmptyBody>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    let deleted = problems::delete(&state.pool, id)
        .await
        .map_err(|e| ApiError::store(e, "Delete failed"))?;

    if deleted {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ApiError::not_found("Not found"))
    }
}

/// POST /admin/post
pub async fn insert_problem(
    State(state): State<AppState>,
    AdminGuard(request): AdminGuard<InsertRequest>,
) -> Result<Json<Value>, ApiError> {
    problems::insert(&state.pool, &request.problem)
        .await
        .map_err(|e| ApiError::store(e, "Insert failed"))?;

    tracing::info!("inserted problem {}", request.problem.id);
    Ok(Json(json!({ "success": true })))
}
