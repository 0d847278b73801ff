//! The coordinating hub
//!
//! [`Hub`] is the single owner of both registries. Every operation takes the
//! write lock once, performs its whole read-modify-write sequence, and
//! collects outbound frames into an [`Outbox`]. The outbox is flushed onto the
//! per-connection queues before the lock is released, so every client sees
//! snapshots in the order the state changed. Enqueuing never blocks; the
//! socket writes happen later on each connection's writer task.

mod dispatch;
mod outbox;
mod teardown;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::client::{Client, ClientId, ClientInfo, ClientRegistry, ConnectionHandle};
use crate::config::HubConfig;
use crate::identity::IdAllocator;
use crate::protocol::{ClientMessage, ProtocolError, ServerMessage};
use crate::session::{Session, SessionId, SessionRegistry};

pub use outbox::Outbox;

/// Identifies one accepted connection
///
/// The token tells apart two connections that held the same client id at
/// different times (after a rejoin).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub client_id: ClientId,
    pub token: Uuid,
}

/// A freshly accepted connection
#[derive(Debug)]
pub struct Connection {
    pub key: ConnectionKey,
    /// Frames to write to the socket, in order; closes when the client is removed
    pub outbound: mpsc::UnboundedReceiver<ServerMessage>,
    /// Whether the requested prior identity was granted
    pub rejoined: bool,
}

/// Registries guarded together by the hub's lock
#[derive(Debug)]
pub(crate) struct HubState {
    pub(crate) clients: ClientRegistry,
    pub(crate) sessions: SessionRegistry,
}

impl HubState {
    fn new(config: &HubConfig) -> Self {
        Self {
            clients: ClientRegistry::new(IdAllocator::new(config.id_base, config.id_ceiling)),
            sessions: SessionRegistry::new(IdAllocator::new(config.id_base, config.id_ceiling)),
        }
    }

    /// Whether `key` still names the live record for its client id
    fn is_current(&self, key: &ConnectionKey) -> bool {
        self.clients
            .get(&key.client_id)
            .is_some_and(|c| c.connection().token() == key.token)
    }

    /// Resolve a session's members, skipping any that have disconnected
    pub(crate) fn members_of(&self, session_id: &str) -> Vec<&Client> {
        self.sessions
            .get(session_id)
            .map(|session| {
                session
                    .client_ids
                    .iter()
                    .filter_map(|id| self.clients.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn member_map(&self, session_id: &str) -> BTreeMap<ClientId, ClientInfo> {
        self.members_of(session_id)
            .into_iter()
            .map(|client| (client.id.clone(), client.info()))
            .collect()
    }
}

/// Connection and session hub
#[derive(Debug)]
pub struct Hub {
    state: RwLock<HubState>,
    config: HubConfig,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            state: RwLock::new(HubState::new(&config)),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Register a new connection
    ///
    /// Evicts stale clients, assigns an identity (granting `requested_id` if
    /// nobody holds it), and queues the `ClientConnect` announcement.
    #[instrument(name = "hub::connect", skip(self))]
    pub async fn connect(&self, requested_id: Option<&str>) -> Connection {
        let requested_id = requested_id.filter(|id| !id.is_empty());
        let (tx, outbound) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new(tx);

        let mut state = self.state.write().await;

        let evicted = match self.stale_cutoff() {
            Some(cutoff) => state.evict_older_than(cutoff).1,
            None => Outbox::new(),
        };

        let granted = requested_id.and_then(|id| state.clients.try_rejoin(id));
        let rejoined = granted.is_some();
        let client_id = match granted {
            Some(id) => id,
            None => state.clients.next_id(),
        };
        let client = Client::new(client_id.clone(), handle.clone());

        // Queued before the record becomes visible, so nothing can overtake it
        handle.send(ServerMessage::ClientConnect {
            client: client.info(),
        });
        if let Some(requested) = requested_id
            && !rejoined
        {
            handle.send(ServerMessage::info(format!(
                "Client ID {requested} is already connected, assigned {client_id}"
            )));
        }

        let key = ConnectionKey {
            client_id: client_id.clone(),
            token: handle.token(),
        };
        evicted.flush();
        state.clients.insert(client);
        drop(state);

        info!(client_id = %client_id, rejoined, "Client connected");

        Connection {
            key,
            outbound,
            rejoined,
        }
    }

    /// Handle one raw inbound text frame
    ///
    /// Frames that cannot be classified are logged and dropped; they never
    /// close the connection.
    pub async fn handle_frame(&self, key: &ConnectionKey, text: &str) {
        match ClientMessage::parse(text) {
            Ok(Some(msg)) => self.dispatch(key, msg).await,
            Ok(None) => debug!(client_id = %key.client_id, "Ignoring unrecognized message type"),
            Err(ProtocolError::MissingType) => {
                debug!(client_id = %key.client_id, "No message type");
            }
            Err(e) => warn!(client_id = %key.client_id, "Dropping frame: {}", e),
        }
    }

    /// Apply an already-parsed message from the given connection
    pub async fn dispatch(&self, key: &ConnectionKey, msg: ClientMessage) {
        let mut state = self.state.write().await;
        if !state.is_current(key) {
            debug!(client_id = %key.client_id, "Dropping message from stale connection");
            return;
        }
        state.dispatch(&key.client_id, msg).flush();
    }

    /// Tear down a connection: leave its session, notify peers, drop its record
    #[instrument(name = "hub::disconnect", skip(self), fields(client_id = %key.client_id))]
    pub async fn disconnect(&self, key: &ConnectionKey) {
        let mut state = self.state.write().await;
        let notified = state.disconnect(key).flush();
        drop(state);
        info!(notified, "Client disconnected");
    }

    /// Evict every client that last joined more than `age` ago
    pub async fn evict_older_than(&self, age: Duration) -> usize {
        let Some(cutoff) = cutoff_for(age) else {
            return 0;
        };
        let mut state = self.state.write().await;
        let (evicted, outbox) = state.evict_older_than(cutoff);
        outbox.flush();
        evicted
    }

    /// Snapshot of every connected client keyed by id
    pub async fn clients(&self) -> BTreeMap<ClientId, ClientInfo> {
        self.state
            .read()
            .await
            .clients
            .all()
            .map(|client| (client.id.clone(), client.info()))
            .collect()
    }

    /// Snapshot of every session keyed by id
    pub async fn sessions(&self) -> BTreeMap<SessionId, Session> {
        self.state
            .read()
            .await
            .sessions
            .all()
            .map(|session| (session.id.clone(), session.clone()))
            .collect()
    }

    pub async fn client(&self, id: &str) -> Option<ClientInfo> {
        self.state.read().await.clients.get(id).map(Client::info)
    }

    pub async fn session(&self, id: &str) -> Option<Session> {
        self.state.read().await.sessions.get(id).cloned()
    }

    pub async fn client_count(&self) -> usize {
        self.state.read().await.clients.len()
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    fn stale_cutoff(&self) -> Option<DateTime<Utc>> {
        cutoff_for(self.config.stale_client_after?)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

fn cutoff_for(age: Duration) -> Option<DateTime<Utc>> {
    let age = chrono::Duration::from_std(age).ok()?;
    Utc::now().checked_sub_signed(age)
}
