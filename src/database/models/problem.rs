use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog problem row.
///
/// `completed` is only populated by queries that join against the caller's
/// completion records; plain catalog reads leave it out of the JSON entirely.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Problem {
    pub id: i32,
    pub title: String,
    pub difficulty: String,
    pub category: String,
    pub roadmap: Option<String>,
    pub roadmap_position: Option<i32>,
    pub subcategory: Option<String>,
    pub subcategory_order: Option<i32>,
    pub description: Option<String>,
    pub solution: Option<String>,
    pub explanation: Option<String>,
    pub yt_link: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Payload for admin inserts. The id is externally assigned, so the caller
/// supplies it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProblem {
    pub id: i32,
    pub title: String,
    pub difficulty: String,
    pub category: String,
    pub roadmap: Option<String>,
    pub roadmap_position: Option<i32>,
    pub subcategory: Option<String>,
    pub subcategory_order: Option<i32>,
    pub description: Option<String>,
    pub solution: Option<String>,
    pub explanation: Option<String>,
    pub yt_link: Option<String>,
}

/// Payload for admin updates. The id comes from the path, never the body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemUpdate {
    pub title: String,
    pub difficulty: String,
    pub category: String,
    pub roadmap: Option<String>,
    pub roadmap_position: Option<i32>,
    pub subcategory: Option<String>,
    pub subcategory_order: Option<i32>,
    pub description: Option<String>,
    pub solution: Option<String>,
    pub explanation: Option<String>,
    pub yt_link: Option<String>,
}
