//! huddle-core: the connection and session hub behind the huddle relay
//!
//! This crate owns everything with an invariant attached to it:
//!
//! - **Identity allocation** - [`IdAllocator`] mints counter-based identities
//!   and [`ClientRegistry::try_rejoin`] grants prior identities back
//! - **Client registry** - [`ClientRegistry`] maps identities to live connection records
//! - **Session registry** - [`SessionRegistry`] tracks owners and ordered member lists
//! - **Dispatch and fan-out** - [`Hub`] classifies inbound frames and delivers
//!   outbound [`ServerMessage`]s to the right members
//!
//! The transport is not part of this crate. A gateway calls [`Hub::connect`]
//! when a socket opens, forwards every text frame to [`Hub::handle_frame`],
//! drains the returned outbound channel into the socket, and calls
//! [`Hub::disconnect`] exactly once when the socket closes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── Hub ─────────────────────────────┐
//! │  RwLock<HubState>                                            │
//! │  ┌──────────────────┐        ┌─────────────────────┐         │
//! │  │  ClientRegistry  │◄──────►│   SessionRegistry   │         │
//! │  │  (IdAllocator)   │        │   (IdAllocator)     │         │
//! │  └──────────────────┘        └─────────────────────┘         │
//! │            │ handlers produce an Outbox under the lock       │
//! │            │ and enqueue it before the lock is released      │
//! └────────────┼─────────────────────────────────────────────────┘
//!              ▼
//!     per-connection mpsc channel ──► gateway writer task ──► socket
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hub;
pub mod identity;
pub mod protocol;
pub mod session;
pub mod typegen;

pub use client::{Client, ClientId, ClientInfo, ClientRegistry, ConnectionHandle};
pub use config::HubConfig;
pub use error::HubError;
pub use hub::{Connection, ConnectionKey, Hub, Outbox};
pub use identity::IdAllocator;
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use session::{Session, SessionId, SessionRegistry};
