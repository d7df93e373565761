//! Per-user completion state.
//!
//! A completion is an existence-only row; toggling and batch-syncing are the
//! only ways rows appear, and reset/account-deletion the only bulk removals.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use super::StoreError;

/// Flip the presence of one (user, problem) completion as a single
/// statement. The delete attempt always runs first; the insert arm only
/// fires when the delete matched nothing, so concurrent callers serialize on
/// the row and the pair ends up either present or absent, never duplicated.
///
/// Returns the state after the call: true when the row now exists.
pub async fn toggle(pool: &PgPool, user_id: &str, problem_id: i32) -> Result<bool, StoreError> {
    let action: Option<String> = sqlx::query_scalar(
        r#"
        WITH delete_attempt AS (
            DELETE FROM completed_problems
            WHERE user_id = $1 AND problem_id = $2
            RETURNING 'deleted' AS action
        ),
        insert_attempt AS (
            INSERT INTO completed_problems (user_id, problem_id)
            SELECT $1, $2
            WHERE NOT EXISTS (SELECT 1 FROM delete_attempt)
            ON CONFLICT (user_id, problem_id) DO NOTHING
            RETURNING 'inserted' AS action
        )
        SELECT action FROM delete_attempt
        UNION ALL
        SELECT action FROM insert_attempt
        "#,
    )
    .bind(user_id)
    .bind(problem_id)
    .fetch_optional(pool)
    .await?;

    // No action row means the insert arm hit a concurrent insert's conflict;
    // the pair is present either way.
    Ok(action.as_deref() != Some("deleted"))
}

/// Outcome of a batch sync. `skipped` counts entries whose key did not parse
/// as a problem id.
#[derive(Debug, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub skipped: usize,
}

/// Drive each (problem id -> desired state) entry to its requested state.
///
/// Entries apply independently and commit one at a time - this is not
/// atomic across the map, so a failure partway through leaves the already
/// applied entries in place. Keys that are not numeric are skipped without
/// failing the call.
pub async fn batch_sync(
    pool: &PgPool,
    user_id: &str,
    changes: &HashMap<String, bool>,
) -> Result<BatchOutcome, StoreError> {
    let mut applied = 0;
    let mut skipped = 0;

    for (key, desired) in changes {
        let Some(problem_id) = parse_problem_key(key) else {
            tracing::debug!("skipping non-numeric problem key {key:?}");
            skipped += 1;
            continue;
        };

        if *desired {
            sqlx::query(
                "INSERT INTO completed_problems (user_id, problem_id) VALUES ($1, $2)
                 ON CONFLICT (user_id, problem_id) DO NOTHING",
            )
            .bind(user_id)
            .bind(problem_id)
            .execute(pool)
            .await?;
        } else {
            sqlx::query("DELETE FROM completed_problems WHERE user_id = $1 AND problem_id = $2")
                .bind(user_id)
                .bind(problem_id)
                .execute(pool)
                .await?;
        }

        applied += 1;
    }

    Ok(BatchOutcome { applied, skipped })
}

/// Ids of every problem the user has completed.
pub async fn completed_ids(pool: &PgPool, user_id: &str) -> Result<Vec<i32>, StoreError> {
    let ids = sqlx::query_scalar::<_, i32>(
        "SELECT problem_id FROM completed_problems WHERE user_id = $1 ORDER BY problem_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Drop every completion for the user. Deleting zero rows is still success.
pub async fn reset(pool: &PgPool, user_id: &str) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM completed_problems WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Per-roadmap totals for one user.
#[derive(Debug, FromRow)]
pub struct RoadmapTally {
    pub roadmap: String,
    pub total: i64,
    pub completed: i64,
}

pub async fn roadmap_tallies(pool: &PgPool, user_id: &str) -> Result<Vec<RoadmapTally>, StoreError> {
    let tallies = sqlx::query_as::<_, RoadmapTally>(
        r#"
        SELECT p.roadmap,
               COUNT(*) AS total,
               COUNT(cp.problem_id) AS completed
        FROM problems p
        LEFT JOIN completed_problems cp
            ON cp.problem_id = p.id AND cp.user_id = $1
        WHERE p.roadmap IS NOT NULL
        GROUP BY p.roadmap
        ORDER BY p.roadmap
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(tallies)
}

/// Rounded completion percentage for a roadmap tally.
pub fn percent(completed: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (completed * 100 + total / 2) / total
}

fn parse_problem_key(key: &str) -> Option<i32> {
    key.trim().parse().ok()
}
