//! Account lifecycle for verified identities.

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::database::{users, StoreError};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// POST /log-user
///
/// Insert-if-absent user record for the caller's verified identity.
pub async fn log_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    users::log_user(&state.pool, &user.uid)
        .await
        .map_err(|e| ApiError::store(e, "Failed to log user"))?;

    Ok(Json(json!({ "success": true })))
}

/// POST /delete-user
///
/// Removes the caller's completions, user record, and identity provider
/// account. A provider refusal rolls the local deletions back.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    users::delete_account(&state.pool, state.verifier.as_ref(), &user.uid, &user.token)
        .await
        .map_err(|e| match e {
            StoreError::IdentityDeletion => {
                tracing::error!("identity provider refused deletion for user {}", user.uid);
                ApiError::internal("Failed to delete account")
            }
            other => ApiError::store(other, "Failed to delete account"),
        })?;

    tracing::info!("deleted account for user {}", user.uid);
    Ok(Json(json!({ "success": true })))
}
