//! Database round-trip tests for the completion store.
//!
//! These need a reachable Postgres; they no-op (with a note on stderr) when
//! DATABASE_URL is not set so the rest of the suite stays runnable anywhere.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use codedrill_api::auth::{AuthError, TokenVerifier};
use codedrill_api::database::{completions, users};

async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .ok()?;

    (&pool)
        .execute(include_str!("../schema.sql"))
        .await
        .expect("failed to apply schema");

    Some(pool)
}

async fn seed_problem(pool: &PgPool, id: i32, roadmap: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO problems (id, title, difficulty, category, roadmap)
         VALUES ($1, 'Seeded Problem', 'Easy', 'Arrays', $2)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .bind(roadmap)
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_user(pool: &PgPool, uid: &str) -> Result<()> {
    users::log_user(pool, uid).await?;
    completions::reset(pool, uid).await?;
    Ok(())
}

struct AcceptingProvider;

#[async_trait]
impl TokenVerifier for AcceptingProvider {
    async fn verify(&self, _token: &str) -> Result<String, AuthError> {
        Err(AuthError::InvalidToken)
    }

    async fn delete_account(&self, _token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

struct RefusingProvider;

#[async_trait]
impl TokenVerifier for RefusingProvider {
    async fn verify(&self, _token: &str) -> Result<String, AuthError> {
        Err(AuthError::InvalidToken)
    }

    async fn delete_account(&self, _token: &str) -> Result<(), AuthError> {
        Err(AuthError::InvalidToken)
    }
}

#[tokio::test]
async fn toggle_twice_returns_to_original_state() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let uid = "it-toggle-user";
    seed_problem(&pool, 9101, "it-toggle").await?;
    seed_user(&pool, uid).await?;

    assert!(completions::toggle(&pool, uid, 9101).await?);
    assert_eq!(completions::completed_ids(&pool, uid).await?, vec![9101]);

    assert!(!completions::toggle(&pool, uid, 9101).await?);
    assert!(completions::completed_ids(&pool, uid).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn concurrent_toggles_never_duplicate_the_pair() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let uid = "it-race-user";
    seed_problem(&pool, 9102, "it-race").await?;
    seed_user(&pool, uid).await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            completions::toggle(&pool, "it-race-user", 9102).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM completed_problems WHERE user_id = $1 AND problem_id = $2",
    )
    .bind(uid)
    .bind(9102)
    .fetch_one(&pool)
    .await?;

    assert!(rows == 0 || rows == 1, "pair duplicated: {rows} rows");
    Ok(())
}

#[tokio::test]
async fn reset_clears_progress_and_is_idempotent() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let uid = "it-reset-user";
    seed_problem(&pool, 9103, "it-reset").await?;
    seed_user(&pool, uid).await?;

    completions::toggle(&pool, uid, 9103).await?;
    assert!(completions::reset(&pool, uid).await? > 0);
    assert!(completions::completed_ids(&pool, uid).await?.is_empty());

    // Deleting zero rows is still success.
    assert_eq!(completions::reset(&pool, uid).await?, 0);
    Ok(())
}

#[tokio::test]
async fn batch_sync_skips_bad_keys_and_applies_the_rest() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let uid = "it-batch-user";
    seed_problem(&pool, 9104, "it-batch").await?;
    seed_problem(&pool, 9105, "it-batch").await?;
    seed_user(&pool, uid).await?;

    let changes = [
        ("9104".to_string(), true),
        ("9105".to_string(), true),
        ("two-sum".to_string(), true),
    ]
    .into_iter()
    .collect();

    let outcome = completions::batch_sync(&pool, uid, &changes).await?;
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(
        completions::completed_ids(&pool, uid).await?,
        vec![9104, 9105]
    );

    // Drive one entry back down; applying the same desired state twice is a
    // no-op, not an error.
    let changes = [("9104".to_string(), false)].into_iter().collect();
    completions::batch_sync(&pool, uid, &changes).await?;
    let changes = [("9104".to_string(), false)].into_iter().collect();
    completions::batch_sync(&pool, uid, &changes).await?;
    assert_eq!(completions::completed_ids(&pool, uid).await?, vec![9105]);
    Ok(())
}

#[tokio::test]
async fn roadmap_progress_counts_completed_share() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let uid = "it-roadmap-user";
    seed_problem(&pool, 9106, "it-roadmap").await?;
    seed_problem(&pool, 9107, "it-roadmap").await?;
    seed_user(&pool, uid).await?;

    completions::toggle(&pool, uid, 9106).await?;

    let tallies = completions::roadmap_tallies(&pool, uid).await?;
    let tally = tallies
        .iter()
        .find(|t| t.roadmap == "it-roadmap")
        .expect("seeded roadmap present");

    assert_eq!(tally.total, 2);
    assert_eq!(tally.completed, 1);
    assert_eq!(completions::percent(tally.completed, tally.total), 50);
    Ok(())
}

#[tokio::test]
async fn delete_account_removes_all_local_state() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let uid = "it-delete-user";
    seed_problem(&pool, 9108, "it-delete").await?;
    seed_user(&pool, uid).await?;
    completions::toggle(&pool, uid, 9108).await?;

    users::delete_account(&pool, &AcceptingProvider, uid, "token").await?;

    assert!(completions::completed_ids(&pool, uid).await?.is_empty());
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(uid)
        .fetch_one(&pool)
        .await?;
    assert_eq!(remaining, 0);
    Ok(())
}

#[tokio::test]
async fn provider_refusal_rolls_back_local_deletions() -> Result<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let uid = "it-rollback-user";
    seed_problem(&pool, 9109, "it-rollback").await?;
    seed_user(&pool, uid).await?;
    completions::toggle(&pool, uid, 9109).await?;

    let result = users::delete_account(&pool, &RefusingProvider, uid, "token").await;
    assert!(result.is_err());

    // Local state survives the failed provider call.
    assert_eq!(completions::completed_ids(&pool, uid).await?, vec![9109]);
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(uid)
        .fetch_one(&pool)
        .await?;
    assert_eq!(remaining, 1);
    Ok(())
}
