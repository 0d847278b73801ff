//! WebSocket protocol message types
//!
//! Every frame is a JSON object with a `type` discriminator. Field names are
//! lowerCamelCase on the wire. `payload` values are opaque and relayed as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::client::{ClientId, ClientInfo};
use crate::session::SessionId;

/// Why an inbound frame was dropped
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("malformed {kind} message: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Set the sender's display name
    UpdateClient { name: String },

    /// Create a session owned by the sender
    CreateSession {
        /// Another connected client to add alongside the owner
        #[serde(default, skip_serializing_if = "Option::is_none")]
        add_client_id: Option<ClientId>,
    },

    /// Add a client to an existing session
    AddClientToSession {
        session_id: SessionId,
        add_client_id: ClientId,
    },

    /// Relay an opaque payload to the sender's active session
    BroadcastToSession { payload: Value },
}

impl ClientMessage {
    /// Discriminators this server understands
    pub const KINDS: [&'static str; 4] = [
        "UpdateClient",
        "CreateSession",
        "AddClientToSession",
        "BroadcastToSession",
    ];

    /// Parse a raw text frame
    ///
    /// The discriminator is read first. Unknown discriminators yield
    /// `Ok(None)` so newer clients can talk to older servers; a known
    /// discriminator with a bad body is a [`ProtocolError::Malformed`].
    pub fn parse(text: &str) -> Result<Option<Self>, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?;

        if !Self::KINDS.contains(&kind) {
            return Ok(None);
        }

        let kind = kind.to_string();
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| ProtocolError::Malformed { kind, source })
    }

    /// The wire discriminator of this message
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::UpdateClient { .. } => "UpdateClient",
            ClientMessage::CreateSession { .. } => "CreateSession",
            ClientMessage::AddClientToSession { .. } => "AddClientToSession",
            ClientMessage::BroadcastToSession { .. } => "BroadcastToSession",
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// First frame on every connection, carrying the assigned record
    ClientConnect { client: ClientInfo },

    /// A client renamed itself
    ClientUpdated { client: ClientInfo },

    /// A client joined a session; `client_map` is the membership after the join
    ClientJoinedSession {
        client_id: ClientId,
        session_id: SessionId,
        session_owner_id: ClientId,
        client_map: BTreeMap<ClientId, ClientInfo>,
    },

    /// A client left a session; `client_map` is the membership after removal
    ClientLeftSession {
        client_id: ClientId,
        session_id: SessionId,
        session_owner_id: ClientId,
        client_map: BTreeMap<ClientId, ClientInfo>,
    },

    /// Payload relayed from another member of the recipient's session
    BroadcastFromSession {
        from_session_owner: bool,
        sender_id: ClientId,
        payload: Value,
    },

    /// Request failed; sent only to the requester
    #[serde(rename = "error")]
    Error { message: String },

    /// Informational notice
    #[serde(rename = "info")]
    Info { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        ServerMessage::Info {
            message: message.into(),
        }
    }
}
