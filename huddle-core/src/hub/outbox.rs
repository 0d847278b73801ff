//! Deferred delivery of outbound frames
//!
//! Handlers run under the hub's write lock and only record what to send.
//! The hub flushes the outbox while still holding the lock: a flush only
//! enqueues onto unbounded per-connection queues and never waits on a socket.

use crate::client::{Client, ConnectionHandle};
use crate::protocol::ServerMessage;

/// Frames addressed to specific connections, waiting to be sent
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<(ConnectionHandle, ServerMessage)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address one frame to one client
    pub fn push(&mut self, to: &Client, msg: ServerMessage) {
        self.deliveries.push((to.connection().clone(), msg));
    }

    /// Address a frame to every client in `recipients`, optionally skipping one
    pub fn fan_out<'a>(
        &mut self,
        recipients: impl IntoIterator<Item = &'a Client>,
        except: Option<&str>,
        msg: &ServerMessage,
    ) {
        for client in recipients {
            if except.is_some_and(|skip| skip == client.id) {
                continue;
            }
            self.push(client, msg.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Send everything; returns how many frames reached a live queue
    pub fn flush(self) -> usize {
        let mut delivered = 0;
        for (connection, msg) in self.deliveries {
            if connection.send(msg) {
                delivered += 1;
            } else {
                tracing::trace!("dropping frame for closed connection");
            }
        }
        delivered
    }
}
