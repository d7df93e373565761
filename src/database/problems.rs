//! Read and admin-write queries for the problem catalog.

use sqlx::PgPool;

use super::models::{NewProblem, Problem, ProblemUpdate};
use super::StoreError;

/// List the whole catalog, ordered by id. When a viewer id is given each row
/// carries a `completed` flag derived from that viewer's completion records.
pub async fn list(pool: &PgPool, viewer: Option<&str>) -> Result<Vec<Problem>, StoreError> {
    let problems = match viewer {
        Some(user_id) => {
            sqlx::query_as::<_, Problem>(
                r#"
                SELECT p.*,
                       EXISTS(
                           SELECT 1 FROM completed_problems
                           WHERE user_id = $1 AND problem_id = p.id
                       ) AS completed
                FROM problems p
                ORDER BY p.id
                "#,
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Problem>("SELECT * FROM problems ORDER BY id")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(problems)
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Option<Problem>, StoreError> {
    let problem = sqlx::query_as::<_, Problem>("SELECT * FROM problems WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(problem)
}

/// Problems on a roadmap, matched case-insensitively.
pub async fn by_roadmap(pool: &PgPool, roadmap: &str) -> Result<Vec<Problem>, StoreError> {
    let problems = sqlx::query_as::<_, Problem>(
        "SELECT * FROM problems WHERE LOWER(roadmap) = LOWER($1) ORDER BY id",
    )
    .bind(roadmap)
    .fetch_all(pool)
    .await?;

    Ok(problems)
}

/// Replace every mutable field of a problem. Returns false when no row
/// matched the id.
pub async fn update(pool: &PgPool, id: i32, changes: &ProblemUpdate) -> Result<bool, StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE problems SET
            title = $1,
            difficulty = $2,
            category = $3,
            roadmap = $4,
            roadmap_position = $5,
            subcategory = $6,
            subcategory_order = $7,
            description = $8,
            solution = $9,
            explanation = $10,
            yt_link = $11
        WHERE id = $12
        "#,
    )
    .bind(&changes.title)
    .bind(&changes.difficulty)
    .bind(&changes.category)
    .bind(&changes.roadmap)
    .bind(changes.roadmap_position)
    .bind(&changes.subcategory)
    .bind(changes.subcategory_order)
    .bind(&changes.description)
    .bind(&changes.solution)
    .bind(&changes.explanation)
    .bind(&changes.yt_link)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a problem (completion records cascade). Returns false when no row
/// matched the id.
pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM problems WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn insert(pool: &PgPool, problem: &NewProblem) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO problems (
            id, title, difficulty, category, roadmap, roadmap_position,
            subcategory, subcategory_order, description, solution,
            explanation, yt_link
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(problem.id)
    .bind(&problem.title)
    .bind(&problem.difficulty)
    .bind(&problem.category)
    .bind(&problem.roadmap)
    .bind(problem.roadmap_position)
    .bind(&problem.subcategory)
    .bind(problem.subcategory_order)
    .bind(&problem.description)
    .bind(&problem.solution)
    .bind(&problem.explanation)
    .bind(&problem.yt_link)
    .execute(pool)
    .await?;

    Ok(())
}
