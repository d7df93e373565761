pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the full application router.
///
/// Guard chains per route group: public catalog reads are rate limited by
/// peer address; identity routes authenticate first so the rate limit can
/// key on the verified user id; admin routes are gated by the shared secret
/// inside the handler's `AdminGuard` extractor.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(catalog_routes(&state))
        .merge(progress_routes(&state))
        .merge(account_routes(&state))
        .merge(admin_routes())
        .with_state(state)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn catalog_routes(state: &AppState) -> Router<AppState> {
    use handlers::problems;

    let limited = Router::new()
        .route("/problems", get(problems::list_problems))
        .route("/problems/:id", get(problems::get_problem))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_reads,
        ));

    // Roadmap reads predate the limiter and stay unguarded.
    Router::new()
        .merge(limited)
        .route(
            "/problems/roadmap/:roadmap",
            get(problems::problems_by_roadmap),
        )
        .route("/api/roadmap-progress", get(handlers::progress::roadmap_progress))
}

fn progress_routes(state: &AppState) -> Router<AppState> {
    use handlers::progress;

    let reads = Router::new()
        .route("/completed-problems", get(progress::completed_problems))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_reads,
        ));

    let writes = Router::new()
        .route("/api/toggle-complete", post(progress::toggle_complete))
        .route("/batch-toggle-complete", post(progress::batch_toggle))
        .route("/reset-progress", post(progress::reset_progress))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_writes,
        ));

    // Auth is the outer layer: the limiter keys on the verified identity.
    Router::new()
        .merge(reads)
        .merge(writes)
        .route_layer(from_fn_with_state(state.clone(), middleware::require_user))
}

fn account_routes(state: &AppState) -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/log-user", post(users::log_user))
        .route("/delete-user", post(users::delete_user))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_writes,
        ))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_user))
}

fn admin_routes() -> Router<AppState> {
    use handlers::admin;

    Router::new()
        .route(
            "/problems/:id",
            put(admin::update_problem).delete(admin::delete_problem),
        )
        .route("/admin/post", post(admin::insert_problem))
}
