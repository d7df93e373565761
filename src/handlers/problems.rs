//! Public catalog reads.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::Problem;
use crate::database::problems;
use crate::error::ApiError;
use crate::middleware::MaybeUser;
use crate::state::AppState;

/// GET /problems
///
/// Signed-in callers get each row annotated with their completion flag;
/// anonymous callers get the bare catalog.
pub async fn list_problems(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<Vec<Problem>>, ApiError> {
    let viewer = user.as_ref().map(|u| u.uid.as_str());

    let rows = problems::list(&state.pool, viewer)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch problems"))?;

    Ok(Json(rows))
}

/// GET /problems/:id
pub async fn get_problem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Problem>, ApiError> {
    let id = parse_id(&id)?;

    let problem = problems::get(&state.pool, id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch problem"))?
        .ok_or_else(|| ApiError::not_found("Problem not found"))?;

    Ok(Json(problem))
}

/// GET /problems/roadmap/:roadmap
pub async fn problems_by_roadmap(
    State(state): State<AppState>,
    Path(roadmap): Path<String>,
) -> Result<Json<Vec<Problem>>, ApiError> {
    let rows = problems::by_roadmap(&state.pool, &roadmap)
        .await
        .map_err(|e| ApiError::store(e, "Failed to fetch problems"))?;

    Ok(Json(rows))
}

pub(super) fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid problem id"))
}
