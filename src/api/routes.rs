//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, patch, post, put};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Templates
        .route("/api/v1/templates", get(handlers::list_templates))
        // Stateless analysis
        .route("/api/v1/analyze", post(handlers::analyze))
        // Strategies
        .route(
            "/api/v1/strategies",
            get(handlers::list_strategies).post(handlers::create_strategy),
        )
        .route("/api/v1/strategies/import", post(handlers::import_strategy))
        .route(
            "/api/v1/strategies/{id}",
            get(handlers::get_strategy).delete(handlers::delete_strategy),
        )
        .route(
            "/api/v1/strategies/{id}/underlying",
            put(handlers::update_underlying),
        )
        .route(
            "/api/v1/strategies/{id}/export",
            get(handlers::export_strategy),
        )
        .route(
            "/api/v1/strategies/{id}/template",
            post(handlers::apply_template),
        )
        // Legs
        .route("/api/v1/strategies/{id}/legs", post(handlers::add_leg))
        .route(
            "/api/v1/strategies/{id}/legs/{leg_id}",
            patch(handlers::update_leg).delete(handlers::delete_leg),
        )
        .with_state(state)
}
