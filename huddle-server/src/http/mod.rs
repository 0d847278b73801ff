//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::AppState;
use crate::ws::ws_handler;

pub use api::HealthResponse;

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/v1/ws", get(ws_handler))
        .route("/api/v1/clients", get(api::list_clients))
        .route("/api/v1/sessions", get(api::list_sessions))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
