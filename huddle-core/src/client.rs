//! Connected clients and the registry that owns them

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::HubError;
use crate::identity::IdAllocator;
use crate::protocol::ServerMessage;
use crate::session::SessionId;

/// Unique identifier for a connected client
pub type ClientId = String;

/// Sending half of a client's outbound frame queue
///
/// The gateway's writer task owns the receiving half and is the only writer
/// on the socket. Dropping the last handle closes the queue, which in turn
/// closes the socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    token: Uuid,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHandle {
    /// Wrap an outbound queue with a fresh connection token
    pub fn new(tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            token: Uuid::new_v4(),
            tx,
        }
    }

    /// Token distinguishing this connection from any later one reusing the same identity
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// Queue a frame; returns false if the connection is already gone
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.tx.send(msg).is_ok()
    }
}

/// Connection-state record for one live client
#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    /// Display name, empty until the client sets one
    pub name: String,
    /// The single session this client currently belongs to
    pub active_session_id: Option<SessionId>,
    /// When the client connected or rejoined
    pub last_join_time: DateTime<Utc>,
    connection: ConnectionHandle,
}

impl Client {
    pub fn new(id: ClientId, connection: ConnectionHandle) -> Self {
        Self {
            id,
            name: String::new(),
            active_session_id: None,
            last_join_time: Utc::now(),
            connection,
        }
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Wire representation of this record
    pub fn info(&self) -> ClientInfo {
        ClientInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            last_join_time: self.last_join_time,
            active_session_id: self.active_session_id.clone(),
        }
    }
}

/// Client record as it appears in outbound messages and diagnostics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: ClientId,
    pub name: String,
    pub last_join_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_session_id: Option<SessionId>,
}

/// The live set of connected clients
#[derive(Debug)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
    ids: IdAllocator,
}

impl ClientRegistry {
    pub fn new(ids: IdAllocator) -> Self {
        Self {
            clients: HashMap::new(),
            ids,
        }
    }

    /// Mint a fresh identity not held by any live client
    pub fn next_id(&mut self) -> ClientId {
        let clients = &self.clients;
        self.ids.next(|id| clients.contains_key(id))
    }

    /// Grant `requested` back if no live client currently holds it
    pub fn try_rejoin(&self, requested: &str) -> Option<ClientId> {
        if requested.is_empty() || self.clients.contains_key(requested) {
            return None;
        }
        Some(requested.to_string())
    }

    /// Insert a client, returning any record it replaced
    pub fn insert(&mut self, client: Client) -> Option<Client> {
        self.clients.insert(client.id.clone(), client)
    }

    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clients.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Client> {
        self.clients.remove(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Rename a client, returning the updated record
    pub fn set_name(&mut self, id: &str, name: impl Into<String>) -> Result<&Client, HubError> {
        let client = self
            .clients
            .get_mut(id)
            .ok_or_else(|| HubError::ClientNotFound(id.to_string()))?;
        client.name = name.into();
        Ok(client)
    }

    /// Point a client at a session (or at none)
    pub fn set_active_session(
        &mut self,
        id: &str,
        session_id: Option<SessionId>,
    ) -> Result<(), HubError> {
        let client = self
            .clients
            .get_mut(id)
            .ok_or_else(|| HubError::ClientNotFound(id.to_string()))?;
        client.active_session_id = session_id;
        Ok(())
    }

    /// Remove every client whose last join predates `cutoff`
    ///
    /// The removed records are returned so the caller can finish their
    /// teardown; dropping them closes their connections.
    pub fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> Vec<Client> {
        let stale: Vec<ClientId> = self
            .clients
            .values()
            .filter(|client| client.last_join_time < cutoff)
            .map(|client| client.id.clone())
            .collect();

        stale
            .iter()
            .filter_map(|id| self.clients.remove(id))
            .collect()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(IdAllocator::default())
    }
}
