//! Shared application state for the huddle server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use huddle_core::{Hub, HubConfig};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// The connection and session hub
    pub hub: Arc<Hub>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new AppState around a fresh hub
    pub fn new(config: HubConfig) -> Self {
        Self::with_hub(Arc::new(Hub::new(config)))
    }

    /// Create AppState around an existing hub (for testing)
    pub fn with_hub(hub: Arc<Hub>) -> Self {
        Self {
            hub,
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(HubConfig::default());
        assert!(state.uptime_seconds() >= 0);
    }

    #[test]
    fn test_app_state_with_hub_shares_hub() {
        let hub = Arc::new(Hub::default());
        let state = AppState::with_hub(Arc::clone(&hub));
        assert!(Arc::ptr_eq(&state.hub, &hub));
    }
}
