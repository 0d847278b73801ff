//! WebSocket protocol integration tests
//!
//! These tests drive a real server over tokio-tungstenite:
//! - Connect announcements and identity assignment
//! - Session creation, membership errors, and broadcast fan-out
//! - Frames the server must tolerate without dropping the connection

mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::client::{TestClient, WsConnection};
use serde_json::json;

const QUIET: Duration = Duration::from_millis(100);

#[tokio::test]
async fn first_message_is_client_connect() {
    let (state, addr) = common::create_test_server().await;
    let mut conn = WsConnection::connect(addr, None).await;

    let msg = conn.recv_json().await;
    assert_eq!(msg["type"], "ClientConnect");

    let id = msg["client"]["id"].as_str().unwrap();
    assert!(state.hub.client(id).await.is_some());
}

#[tokio::test]
async fn every_connection_gets_a_distinct_identity() {
    let (_state, addr) = common::create_test_server().await;

    let mut clients = Vec::new();
    for _ in 0..5 {
        clients.push(TestClient::connect(addr).await);
    }

    let ids: HashSet<&str> = clients.iter().map(|c| c.client_id.as_str()).collect();
    assert_eq!(ids.len(), clients.len());
}

#[tokio::test]
async fn create_session_makes_creator_owner_and_member() {
    let (state, addr) = common::create_test_server().await;
    let mut alice = TestClient::connect(addr).await;

    let session_id = alice.create_session(None).await;

    let session = state.hub.session(&session_id).await.unwrap();
    assert_eq!(session.owner_id, alice.client_id);
    assert_eq!(session.client_ids, vec![alice.client_id.clone()]);
    let record = state.hub.client(&alice.client_id).await.unwrap();
    assert_eq!(record.active_session_id.as_deref(), Some(session_id.as_str()));
}

#[tokio::test]
async fn add_to_missing_session_returns_error() {
    let (state, addr) = common::create_test_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.add_to_session("9999", &bob.client_id).await;

    let error = alice.expect("error").await;
    assert_eq!(error["message"], "No session with ID 9999");
    bob.expect_no_message(QUIET).await;
    assert_eq!(state.hub.session_count().await, 0);
}

#[tokio::test]
async fn add_missing_client_returns_error() {
    let (state, addr) = common::create_test_server().await;
    let mut alice = TestClient::connect(addr).await;
    let session_id = alice.create_session(None).await;

    alice.add_to_session(&session_id, "9999").await;

    let error = alice.expect("error").await;
    assert_eq!(error["message"], "No client with ID 9999");
    let session = state.hub.session(&session_id).await.unwrap();
    assert_eq!(session.client_ids, vec![alice.client_id.clone()]);
}

#[tokio::test]
async fn add_to_session_notifies_target_and_requester() {
    let (_state, addr) = common::create_test_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let bob_id = bob.client_id.clone();
    let session_id = alice.create_session(None).await;

    alice.add_to_session(&session_id, &bob_id).await;

    for client in [&mut alice, &mut bob] {
        let joined = client.expect("ClientJoinedSession").await;
        assert_eq!(joined["sessionId"], session_id.as_str());
        assert_eq!(joined["clientId"], bob_id.as_str());
        assert_eq!(joined["clientMap"].as_object().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn broadcast_reaches_peers_but_not_sender() {
    let (_state, addr) = common::create_test_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.create_session(Some(&bob.client_id)).await;
    bob.expect("ClientJoinedSession").await;

    let payload = json!({"kind": "frame", "seq": 1});
    alice.broadcast(payload.clone()).await;

    let msg = bob.expect("BroadcastFromSession").await;
    assert_eq!(msg["fromSessionOwner"], true);
    assert_eq!(msg["senderId"], alice.client_id.as_str());
    assert_eq!(msg["payload"], payload);
    alice.expect_no_message(QUIET).await;

    bob.broadcast(json!("ack")).await;
    let msg = alice.expect("BroadcastFromSession").await;
    assert_eq!(msg["fromSessionOwner"], false);
    assert_eq!(msg["senderId"], bob.client_id.as_str());
}

#[tokio::test]
async fn update_client_is_broadcast_to_all_clients() {
    let (_state, addr) = common::create_test_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice.update_name("Alice").await;

    for client in [&mut alice, &mut bob] {
        let msg = client.expect("ClientUpdated").await;
        assert_eq!(msg["client"]["name"], "Alice");
    }
}

#[tokio::test]
async fn bad_frames_do_not_close_the_connection() {
    let (_state, addr) = common::create_test_server().await;
    let mut alice = TestClient::connect(addr).await;

    alice.conn.send_raw("definitely not json").await;
    alice.conn.send_raw(r#"{"no":"type"}"#).await;
    alice.conn.send_raw(r#"{"type":"FutureFeature"}"#).await;
    alice.conn.send_raw(r#"{"type":"UpdateClient"}"#).await;
    alice.expect_no_message(QUIET).await;

    alice.update_name("still here").await;
    let msg = alice.expect("ClientUpdated").await;
    assert_eq!(msg["client"]["name"], "still here");
}

#[tokio::test]
async fn concurrent_adds_keep_every_member() {
    let (state, addr) = common::create_test_server().await;
    let mut owner = TestClient::connect(addr).await;
    let session_id = owner.create_session(None).await;

    let mut bob = TestClient::connect(addr).await;
    let mut carol = TestClient::connect(addr).await;
    let (bob_id, carol_id) = (bob.client_id.clone(), carol.client_id.clone());

    tokio::join!(
        bob.add_to_session(&session_id, &bob_id),
        carol.add_to_session(&session_id, &carol_id),
    );
    bob.expect("ClientJoinedSession").await;
    carol.expect("ClientJoinedSession").await;

    let session = state.hub.session(&session_id).await.unwrap();
    assert_eq!(session.client_ids.len(), 3);
    for id in [&owner.client_id, &bob_id, &carol_id] {
        assert_eq!(session.client_ids.iter().filter(|m| *m == id).count(), 1);
    }
}
