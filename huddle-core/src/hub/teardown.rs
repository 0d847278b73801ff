//! Leaving sessions, disconnects, and stale-client eviction

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::protocol::ServerMessage;

use super::outbox::Outbox;
use super::{ConnectionKey, HubState};

impl HubState {
    /// Remove `client_id` from `session_id` and tell the remaining members
    ///
    /// Absent sessions or members are a no-op. The session itself is kept
    /// even when it becomes empty.
    pub(crate) fn leave_session(&mut self, client_id: &str, session_id: &str, outbox: &mut Outbox) {
        let Some(owner_id) = self.sessions.get(session_id).map(|s| s.owner_id.clone()) else {
            return;
        };

        let was_member = self.sessions.remove_member(session_id, client_id);
        let still_active = self
            .clients
            .get(client_id)
            .is_some_and(|c| c.active_session_id.as_deref() == Some(session_id));
        if still_active {
            let _ = self.clients.set_active_session(client_id, None);
        }
        if !was_member {
            return;
        }
        debug!(session_id, client_id, "Client left session");

        let msg = ServerMessage::ClientLeftSession {
            client_id: client_id.to_string(),
            session_id: session_id.to_string(),
            session_owner_id: owner_id,
            client_map: self.member_map(session_id),
        };
        outbox.fan_out(self.members_of(session_id), Some(client_id), &msg);
    }

    /// Tear down the connection identified by `key`
    ///
    /// Does nothing if the record is gone or now belongs to a newer
    /// connection that rejoined under the same identity.
    pub(crate) fn disconnect(&mut self, key: &ConnectionKey) -> Outbox {
        let mut outbox = Outbox::new();
        if !self.is_current(key) {
            debug!(client_id = %key.client_id, "Connection already torn down");
            return outbox;
        }

        let active = self
            .clients
            .get(&key.client_id)
            .and_then(|c| c.active_session_id.clone());
        if let Some(session_id) = active {
            self.leave_session(&key.client_id, &session_id, &mut outbox);
        }

        // Dropping the record drops the last handle and closes the socket
        self.clients.remove(&key.client_id);
        outbox
    }

    /// Evict clients whose last join predates `cutoff`, running the same
    /// session cleanup as a disconnect
    pub(crate) fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> (usize, Outbox) {
        let mut outbox = Outbox::new();
        let evicted = self.clients.evict_older_than(cutoff);

        for client in &evicted {
            info!(client_id = %client.id, last_join = %client.last_join_time, "Evicting stale client");
            if let Some(session_id) = &client.active_session_id {
                self.leave_session(&client.id, session_id, &mut outbox);
            }
        }

        (evicted.len(), outbox)
    }
}
