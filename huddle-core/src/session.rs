//! Sessions and the registry that owns their membership

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ClientId;
use crate::error::HubError;
use crate::identity::IdAllocator;

/// Unique identifier for a session
pub type SessionId = String;

/// An ad-hoc group of clients with one owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    /// The client that created the session; never changes
    pub owner_id: ClientId,
    /// Members in join order, without duplicates
    pub client_ids: Vec<ClientId>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, owner_id: ClientId) -> Self {
        Self {
            id,
            owner_id,
            client_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owner(&self, client_id: &str) -> bool {
        self.owner_id == client_id
    }

    pub fn has_member(&self, client_id: &str) -> bool {
        self.client_ids.iter().any(|id| id == client_id)
    }
}

/// All sessions created since startup
///
/// Sessions are never reaped: an empty session stays addressable until the
/// process exits.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    ids: IdAllocator,
}

impl SessionRegistry {
    pub fn new(ids: IdAllocator) -> Self {
        Self {
            sessions: HashMap::new(),
            ids,
        }
    }

    /// Create an empty session owned by `owner_id`
    pub fn create(&mut self, owner_id: &str) -> &Session {
        let sessions = &self.sessions;
        let id = self.ids.next(|id| sessions.contains_key(id));
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id, owner_id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Append a member; returns false if it was already present
    pub fn add_member(&mut self, session_id: &str, client_id: &str) -> Result<bool, HubError> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| HubError::SessionNotFound(session_id.to_string()))?;

        if session.has_member(client_id) {
            return Ok(false);
        }
        session.client_ids.push(client_id.to_string());
        Ok(true)
    }

    /// Remove a member; absent sessions or members are ignored
    pub fn remove_member(&mut self, session_id: &str, client_id: &str) -> bool {
        let Some(session) = self.sessions.get_mut(session_id) else {
            return false;
        };
        let before = session.client_ids.len();
        session.client_ids.retain(|id| id != client_id);
        session.client_ids.len() != before
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(IdAllocator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_with_no_members() {
        let mut registry = SessionRegistry::default();
        let session = registry.create("owner");

        assert_eq!(session.id, "1");
        assert_eq!(session.owner_id, "owner");
        assert!(session.client_ids.is_empty());
    }

    #[test]
    fn add_member_preserves_join_order_and_rejects_duplicates() {
        let mut registry = SessionRegistry::default();
        let id = registry.create("a").id.clone();

        assert!(registry.add_member(&id, "a").unwrap());
        assert!(registry.add_member(&id, "b").unwrap());
        assert!(!registry.add_member(&id, "a").unwrap());

        assert_eq!(registry.get(&id).unwrap().client_ids, vec!["a", "b"]);
    }

    #[test]
    fn add_member_to_missing_session_fails() {
        let mut registry = SessionRegistry::default();
        assert_eq!(
            registry.add_member("404", "a").unwrap_err(),
            HubError::SessionNotFound("404".to_string())
        );
    }

    #[test]
    fn remove_member_is_idempotent() {
        let mut registry = SessionRegistry::default();
        let id = registry.create("a").id.clone();
        registry.add_member(&id, "a").unwrap();

        assert!(registry.remove_member(&id, "a"));
        assert!(!registry.remove_member(&id, "a"));
        assert!(!registry.remove_member("404", "a"));
        assert!(registry.contains(&id), "empty sessions are retained");
    }

    #[test]
    fn session_serializes_camel_case() {
        let session = Session::new("5".to_string(), "9".to_string());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["ownerId"], "9");
        assert!(json["clientIds"].as_array().unwrap().is_empty());
        assert!(json.get("createdAt").is_some());
    }
}
