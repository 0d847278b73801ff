//! WebSocket module for real-time communication

mod connection;

pub use connection::{ConnectQuery, ws_handler};
