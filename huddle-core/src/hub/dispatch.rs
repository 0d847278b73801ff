//! Routing of inbound messages to their handlers

use tracing::{debug, info, instrument, warn};

use crate::error::HubError;
use crate::protocol::{ClientMessage, ServerMessage};

use super::HubState;
use super::outbox::Outbox;

/// Who asked for a join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JoinOrigin {
    /// An explicit `AddClientToSession` from a client
    Request,
    /// Replayed internally while building a new session
    Replay,
}

impl HubState {
    /// Apply one inbound message from `sender_id`
    #[instrument(name = "hub::dispatch", skip(self, msg), fields(client_id = %sender_id, kind = msg.kind()))]
    pub(crate) fn dispatch(&mut self, sender_id: &str, msg: ClientMessage) -> Outbox {
        let mut outbox = Outbox::new();

        match msg {
            ClientMessage::UpdateClient { name } => {
                self.update_client(sender_id, name, &mut outbox);
            }
            ClientMessage::CreateSession { add_client_id } => {
                self.create_session(sender_id, add_client_id.as_deref(), &mut outbox);
            }
            ClientMessage::AddClientToSession {
                session_id,
                add_client_id,
            } => {
                if let Err(e) = self.add_client_to_session(
                    sender_id,
                    &session_id,
                    &add_client_id,
                    JoinOrigin::Request,
                    &mut outbox,
                ) {
                    warn!("Add to session failed: {}", e);
                    if let Some(sender) = self.clients.get(sender_id) {
                        outbox.push(sender, ServerMessage::error(e.to_string()));
                    }
                }
            }
            ClientMessage::BroadcastToSession { payload } => {
                self.broadcast_to_session(sender_id, payload, &mut outbox);
            }
        }

        outbox
    }

    fn update_client(&mut self, sender_id: &str, name: String, outbox: &mut Outbox) {
        let client = match self.clients.set_name(sender_id, name) {
            Ok(client) => client.info(),
            Err(e) => {
                warn!("Rename failed: {}", e);
                return;
            }
        };

        let msg = ServerMessage::ClientUpdated { client };
        outbox.fan_out(self.clients.all(), None, &msg);
    }

    fn create_session(&mut self, owner_id: &str, add_client_id: Option<&str>, outbox: &mut Outbox) {
        let session_id = self.sessions.create(owner_id).id.clone();
        info!(session_id = %session_id, "Created session");

        // Membership goes through the same join path as an explicit add
        if let Err(e) =
            self.add_client_to_session(owner_id, &session_id, owner_id, JoinOrigin::Replay, outbox)
        {
            warn!("Owner could not join new session {}: {}", session_id, e);
            return;
        }

        let Some(target) = add_client_id else {
            return;
        };
        if target == owner_id || !self.clients.contains(target) {
            debug!(target, "Skipping additional member that is not connected");
            return;
        }
        if let Err(e) =
            self.add_client_to_session(owner_id, &session_id, target, JoinOrigin::Replay, outbox)
        {
            warn!("Could not add {} to new session {}: {}", target, session_id, e);
        }
    }

    /// Join `client_id` to `session_id`
    ///
    /// Both ids are resolved before anything is mutated, so a failure leaves
    /// the registries untouched. A client already active in another session
    /// leaves it first.
    pub(crate) fn add_client_to_session(
        &mut self,
        requester_id: &str,
        session_id: &str,
        client_id: &str,
        origin: JoinOrigin,
        outbox: &mut Outbox,
    ) -> Result<(), HubError> {
        let owner_id = self
            .sessions
            .get(session_id)
            .ok_or_else(|| HubError::SessionNotFound(session_id.to_string()))?
            .owner_id
            .clone();
        let previous = self
            .clients
            .get(client_id)
            .ok_or_else(|| HubError::ClientNotFound(client_id.to_string()))?
            .active_session_id
            .clone();

        if let Some(previous) = previous.filter(|previous| previous != session_id) {
            self.leave_session(client_id, &previous, outbox);
        }

        self.sessions.add_member(session_id, client_id)?;
        self.clients
            .set_active_session(client_id, Some(session_id.to_string()))?;
        debug!(session_id, client_id, "Client joined session");

        let msg = ServerMessage::ClientJoinedSession {
            client_id: client_id.to_string(),
            session_id: session_id.to_string(),
            session_owner_id: owner_id,
            client_map: self.member_map(session_id),
        };

        if origin == JoinOrigin::Request
            && requester_id != client_id
            && let Some(requester) = self.clients.get(requester_id)
        {
            outbox.push(requester, msg.clone());
        }
        if let Some(target) = self.clients.get(client_id) {
            outbox.push(target, msg);
        }

        Ok(())
    }

    fn broadcast_to_session(
        &mut self,
        sender_id: &str,
        payload: serde_json::Value,
        outbox: &mut Outbox,
    ) {
        let Some(session_id) = self
            .clients
            .get(sender_id)
            .and_then(|sender| sender.active_session_id.as_deref())
        else {
            debug!("Sender has no active session, dropping broadcast");
            return;
        };
        let Some(session) = self.sessions.get(session_id) else {
            debug!(session_id, "Active session no longer exists, dropping broadcast");
            return;
        };

        let msg = ServerMessage::BroadcastFromSession {
            from_session_owner: session.is_owner(sender_id),
            sender_id: sender_id.to_string(),
            payload,
        };
        outbox.fan_out(self.members_of(session_id), Some(sender_id), &msg);
    }
}
