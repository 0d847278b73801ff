//! Shared test utilities for huddle-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use huddle_core::HubConfig;
use huddle_server::{AppState, HuddleServer, ServerConfig};
use tokio::net::TcpListener;

/// Creates a test server with default config, returns state and address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_hub(HubConfig::default()).await
}

/// Creates a test server with custom hub config
#[allow(dead_code)]
pub async fn create_test_server_with_hub(hub: HubConfig) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::new(hub.clone()));
    let server = HuddleServer::with_state(ServerConfig::default().with_hub(hub), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Waits until the hub has torn down `client_id`
#[allow(dead_code)]
pub async fn wait_for_disconnect(state: &AppState, client_id: &str) {
    for _ in 0..200 {
        if state.hub.client(client_id).await.is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("client {client_id} was never torn down");
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: HuddleServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(Duration::from_millis(10)).await;

    addr
}
