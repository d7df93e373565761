use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::auth::{AdminCredential, FirebaseTokenVerifier, StaticKey, TokenVerifier};
use crate::config::AppConfig;
use crate::middleware::{RateLimit, WindowLimiter};

/// Shared application state handed to the router.
///
/// The identity provider, admin credential scheme, and limiter backend sit
/// behind trait objects; implementations are chosen once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub verifier: Arc<dyn TokenVerifier>,
    pub admin: Arc<dyn AdminCredential>,
    pub limiter: Arc<dyn RateLimit>,
}

impl AppState {
    /// Build production state from config. The pool connects lazily so the
    /// process can start (and report degraded health) while the database is
    /// down.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
            .connect_lazy(&config.database.url)?;

        let verifier = FirebaseTokenVerifier::new(&config.identity)?;
        let limiter = WindowLimiter::new(
            config.rate_limit.read_max,
            config.rate_limit.write_max,
            Duration::from_secs(config.rate_limit.window_secs),
        );

        Ok(Self {
            pool,
            verifier: Arc::new(verifier),
            admin: Arc::new(StaticKey::new(config.admin.secret_key.clone())),
            limiter: Arc::new(limiter),
        })
    }
}
