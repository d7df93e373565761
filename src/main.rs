use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use codedrill_api::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();

    if config.admin.secret_key.is_none() {
        tracing::warn!("ADMIN_SECRET not set - admin routes will reject every request");
    }
    if config.identity.api_key.is_empty() {
        tracing::warn!("FIREBASE_API_KEY not set - bearer tokens will fail verification");
    }

    let state = AppState::new(&config)?;
    let router = app(state);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on http://{bind_addr}");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
