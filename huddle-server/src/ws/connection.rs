//! WebSocket connection handling
//!
//! Each socket gets two halves: a writer task that drains the hub's outbound
//! queue for this client (the only writer on the socket), and the reader loop
//! below that feeds text frames into the hub.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::Connection;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::AppState;

/// Query parameters accepted on upgrade
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    /// Identity from a previous connection to try to reclaim
    #[serde(default)]
    pub client_id: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, remote, query))
}

/// Handle a WebSocket connection from accept to teardown
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    remote: SocketAddr,
    query: ConnectQuery,
) {
    let (mut sender, mut receiver) = socket.split();

    let Connection {
        key, mut outbound, ..
    } = state.hub.connect(query.client_id.as_deref()).await;
    info!(client_id = %key.client_id, %remote, "WebSocket client connected");

    let mut writer = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        // Queue closed: the hub dropped this client
        let _ = sender.close().await;
    });

    let mut writer_done = false;
    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    state.hub.handle_frame(&key, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!("WebSocket client sent close frame");
                    break;
                }
                Some(Ok(_)) => {
                    // Binary frames are not part of the protocol; pings are answered by axum
                }
                Some(Err(e)) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
            },
            _ = &mut writer => {
                debug!(client_id = %key.client_id, "Outbound queue closed, dropping connection");
                writer_done = true;
                break;
            }
        }
    }

    state.hub.disconnect(&key).await;
    if !writer_done {
        // Lets already-queued frames drain; ends once the hub's handle is gone
        let _ = writer.await;
    }

    info!(client_id = %key.client_id, %remote, "WebSocket client disconnected");
}
