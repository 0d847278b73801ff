//! huddle-server - HTTP and WebSocket gateway for the huddle relay
//!
//! This crate owns the transport: it upgrades `/api/v1/ws` requests, pumps
//! frames between each socket and the [`huddle_core::Hub`], and serves the
//! read-only diagnostics endpoints.

mod error;
pub mod http;
mod state;
pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use huddle_core::HubConfig;
use tokio::net::TcpListener;

pub use error::ServerError;
pub use http::create_router;
pub use state::AppState;

/// Default port for the huddle server
pub const DEFAULT_PORT: u16 = 4010;
/// Default host for the huddle server
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The main huddle server
pub struct HuddleServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HuddleServer {
    /// Create a new server with a fresh hub
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(AppState::new(config.hub.clone()));
        Self { config, state }
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("huddle server listening on {}", addr);
        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let router = create_router(self.state);
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Hub tuning
    pub hub: HubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            hub: HubConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            hub: HubConfig::default(),
        }
    }

    /// Replace the hub configuration
    pub fn with_hub(mut self, hub: HubConfig) -> Self {
        self.hub = hub;
        self
    }

    /// Returns the socket address string (e.g., "0.0.0.0:4010")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
