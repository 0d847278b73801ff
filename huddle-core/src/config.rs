//! Hub tuning knobs

use std::time::Duration;

/// Default first value handed out by the identity counters
pub const DEFAULT_ID_BASE: u64 = 1;
/// Default ceiling after which the identity counters wrap back to the base
pub const DEFAULT_ID_CEILING: u64 = 100_000;
/// Default age after which a client is considered stale
pub const DEFAULT_STALE_CLIENT_AFTER: Duration = Duration::from_secs(12 * 60 * 60);

/// Configuration for a [`crate::Hub`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// First identity value, and the value counters wrap back to
    pub id_base: u64,
    /// Largest identity value before wrapping
    pub id_ceiling: u64,
    /// Clients whose last join is older than this are evicted when a new
    /// connection arrives. `None` disables eviction.
    pub stale_client_after: Option<Duration>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            id_base: DEFAULT_ID_BASE,
            id_ceiling: DEFAULT_ID_CEILING,
            stale_client_after: Some(DEFAULT_STALE_CLIENT_AFTER),
        }
    }
}

impl HubConfig {
    /// Set the identity counter range
    pub fn with_id_range(mut self, base: u64, ceiling: u64) -> Self {
        self.id_base = base;
        self.id_ceiling = ceiling.max(base);
        self
    }

    /// Set (or disable) the stale-client threshold
    pub fn with_stale_client_after(mut self, after: Option<Duration>) -> Self {
        self.stale_client_after = after;
        self
    }
}
