//! API route modules.

pub mod auth;
pub mod health;
pub mod integrations;
pub mod report;
pub mod user;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router());

    // Protected routes (require auth)
    let protected_routes = Router::new()
        .merge(user::router())
        .merge(integrations::router())
        .merge(report::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
