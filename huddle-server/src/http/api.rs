//! REST API handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Number of connected clients
    pub clients: usize,
    /// Number of sessions created since startup
    pub sessions: usize,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        clients: state.hub.client_count().await,
        sessions: state.hub.session_count().await,
    })
}

/// GET /api/v1/clients - dump the client registry
pub async fn list_clients(State(state): State<Arc<AppState>>) -> Response {
    pretty_json(&state.hub.clients().await)
}

/// GET /api/v1/sessions - dump the session registry
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Response {
    pretty_json(&state.hub.sessions().await)
}

/// Indented JSON body, for humans poking at the diagnostics endpoints
fn pretty_json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_string_pretty(value) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            error!("Failed to serialize diagnostics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
