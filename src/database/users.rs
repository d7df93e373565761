//! User records and the account-deletion flow.

use sqlx::PgPool;

use super::StoreError;
use crate::auth::TokenVerifier;

/// Insert-if-absent user record for a verified identity. Called on every
/// login, so the conflict path is the common one.
pub async fn log_user(pool: &PgPool, user_id: &str) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a user's completions, their user record, and their identity
/// provider account.
///
/// The local deletions happen inside one transaction, completions first so
/// no orphaned completion row is ever queryable. The provider call runs
/// before commit: if the provider refuses, the transaction rolls back and
/// local state is untouched.
pub async fn delete_account(
    pool: &PgPool,
    verifier: &dyn TokenVerifier,
    user_id: &str,
    token: &str,
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM completed_problems WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if verifier.delete_account(token).await.is_err() {
        tx.rollback().await?;
        return Err(StoreError::IdentityDeletion);
    }

    tx.commit().await?;
    Ok(())
}
