pub mod completions;
pub mod models;
pub mod problems;
pub mod users;

use thiserror::Error;

/// Errors from the persistence layer.
///
/// Callers log these and map them to generic client-facing messages; the
/// variants exist for control flow, not for surfacing detail.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity provider refused account deletion")]
    IdentityDeletion,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
