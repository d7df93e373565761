//! Best-effort request throttling.
//!
//! Counters are process-local and in-memory; in a multi-instance deployment
//! this degrades to per-instance limits. The `RateLimit` trait keeps call
//! sites unaware of that so a shared external counter can be substituted.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request class being limited. Reads and writes get separate budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Read,
    Write,
}

/// Outcome of an admission check.
#[derive(Debug)]
pub enum Admission {
    Admitted,
    Throttled { retry_after: Duration },
}

pub trait RateLimit: Send + Sync {
    fn admit(&self, key: &str, bucket: Bucket) -> Admission;
}

/// Per-key request counter over a fixed window.
struct Window {
    count: u32,
    started: Instant,
}

/// In-memory limiter: one window per (bucket, key), windows reset
/// independently. The dashmap entry lock serializes the
/// increment-and-compare for a key.
pub struct WindowLimiter {
    windows: DashMap<(Bucket, String), Window>,
    read_max: u32,
    write_max: u32,
    window: Duration,
}

impl WindowLimiter {
    pub fn new(read_max: u32, write_max: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            read_max,
            write_max,
            window,
        }
    }

    fn max_for(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Read => self.read_max,
            Bucket::Write => self.write_max,
        }
    }

    /// Remove windows that have fully expired to keep memory bounded.
    /// Call periodically from a background task.
    pub fn gc(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, window| now.duration_since(window.started) < self.window);
    }
}

impl RateLimit for WindowLimiter {
    fn admit(&self, key: &str, bucket: Bucket) -> Admission {
        let now = Instant::now();
        let max = self.max_for(bucket);

        let mut entry = self
            .windows
            .entry((bucket, key.to_string()))
            .or_insert_with(|| Window {
                count: 0,
                started: now,
            });

        let elapsed = now.duration_since(entry.started);
        if elapsed >= self.window {
            entry.count = 0;
            entry.started = now;
        }

        if entry.count < max {
            entry.count += 1;
            Admission::Admitted
        } else {
            Admission::Throttled {
                retry_after: self.window.saturating_sub(elapsed),
            }
        }
    }
}

/// Guard for read routes.
pub async fn limit_reads(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    admit(&state, Bucket::Read, request, next).await
}

/// Guard for mutating routes.
pub async fn limit_writes(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    admit(&state, Bucket::Write, request, next).await
}

async fn admit(
    state: &AppState,
    bucket: Bucket,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = limit_key(&request);

    match state.limiter.admit(&key, bucket) {
        Admission::Admitted => Ok(next.run(request).await),
        Admission::Throttled { retry_after } => {
            tracing::debug!("throttled {:?} request for key {key}", bucket);
            Err(ApiError::throttled(retry_after_secs(retry_after)))
        }
    }
}

/// Limit by verified user id when the auth guard already ran, otherwise by
/// peer address.
fn limit_key(request: &Request) -> String {
    if let Some(user) = request.extensions().get::<AuthUser>() {
        return user.uid.clone();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn retry_after_secs(retry_after: Duration) -> u64 {
    // Round up so a client that waits the advertised time lands in the
    // next window.
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}
