//! Error types for huddle-core

use thiserror::Error;

/// Request-level failures reported back to the requesting client
///
/// The `Display` text is sent verbatim as the body of the outbound
/// `error` message, so keep it readable for end users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("No session with ID {0}")]
    SessionNotFound(String),

    #[error("No client with ID {0}")]
    ClientNotFound(String),
}
