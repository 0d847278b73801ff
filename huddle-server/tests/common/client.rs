//! WebSocket test client for protocol testing
//!
//! Provides both low-level WsConnection and high-level TestClient.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to the upgrade endpoint, optionally asking for a prior identity
    pub async fn connect(addr: SocketAddr, client_id: Option<&str>) -> Self {
        let url = match client_id {
            Some(id) => format!("ws://{}/api/v1/ws?clientId={}", addr, id),
            None => format!("ws://{}/api/v1/ws", addr),
        };
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send JSON message
    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return text.to_string(),
                Some(Ok(Message::Ping(_))) => continue,
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {}", e),
                None => panic!("WebSocket closed"),
            }
        }
    }

    /// Receive and parse a JSON message
    pub async fn recv_json(&mut self) -> Value {
        let text = tokio::time::timeout(Duration::from_secs(5), self.recv_raw())
            .await
            .expect("Timed out waiting for message");
        serde_json::from_str(&text).expect("Failed to parse JSON")
    }

    /// Receive with timeout, returns None if timeout
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        tokio::time::timeout(duration, self.recv_raw()).await.ok()
    }

    /// Wait for the server to close the socket, skipping queued frames
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) {
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => continue,
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "Timed out waiting for server to close");
    }

    /// Send a close frame
    pub async fn close(mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
    }
}

/// High-level test client with helper methods
pub struct TestClient {
    pub conn: WsConnection,
    pub client_id: String,
}

impl TestClient {
    /// Connect to server (consumes the initial ClientConnect message)
    #[allow(dead_code)]
    pub async fn connect(addr: SocketAddr) -> Self {
        Self::connect_as(addr, None).await
    }

    /// Connect asking to reclaim `client_id`
    #[allow(dead_code)]
    pub async fn connect_as(addr: SocketAddr, client_id: Option<&str>) -> Self {
        let mut conn = WsConnection::connect(addr, client_id).await;

        let connect_msg = conn.recv_json().await;
        assert_eq!(
            connect_msg["type"], "ClientConnect",
            "Expected ClientConnect message on connect"
        );
        let client_id = connect_msg["client"]["id"].as_str().unwrap().to_string();

        Self { conn, client_id }
    }

    /// Set this client's display name
    #[allow(dead_code)]
    pub async fn update_name(&mut self, name: &str) {
        self.conn
            .send_json(&json!({"type": "UpdateClient", "name": name}))
            .await;
    }

    /// Create a session, returns the session ID from the join announcement
    #[allow(dead_code)]
    pub async fn create_session(&mut self, add_client_id: Option<&str>) -> String {
        let mut msg = json!({"type": "CreateSession"});
        if let Some(id) = add_client_id {
            msg["addClientId"] = json!(id);
        }
        self.conn.send_json(&msg).await;

        let response = self.expect("ClientJoinedSession").await;
        assert_eq!(response["clientId"], self.client_id.as_str());
        assert_eq!(response["sessionOwnerId"], self.client_id.as_str());
        response["sessionId"].as_str().unwrap().to_string()
    }

    /// Ask the server to add `client_id` to `session_id`
    #[allow(dead_code)]
    pub async fn add_to_session(&mut self, session_id: &str, client_id: &str) {
        self.conn
            .send_json(&json!({
                "type": "AddClientToSession",
                "sessionId": session_id,
                "addClientId": client_id,
            }))
            .await;
    }

    /// Broadcast a payload to the active session
    #[allow(dead_code)]
    pub async fn broadcast(&mut self, payload: Value) {
        self.conn
            .send_json(&json!({"type": "BroadcastToSession", "payload": payload}))
            .await;
    }

    /// Receive next message
    #[allow(dead_code)]
    pub async fn recv(&mut self) -> Value {
        self.conn.recv_json().await
    }

    /// Receive the next message and assert its type
    #[allow(dead_code)]
    pub async fn expect(&mut self, msg_type: &str) -> Value {
        let msg = self.recv().await;
        assert_eq!(msg["type"], msg_type, "Expected {} but got: {}", msg_type, msg);
        msg
    }

    /// Assert no message received within duration
    #[allow(dead_code)]
    pub async fn expect_no_message(&mut self, duration: Duration) {
        assert!(
            self.conn.recv_timeout(duration).await.is_none(),
            "Expected no message but received one"
        );
    }

    /// Close the connection
    #[allow(dead_code)]
    pub async fn close(self) {
        self.conn.close().await;
    }
}
