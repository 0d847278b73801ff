use std::time::Duration;

use huddle_core::HubConfig;
use huddle_core::config::{DEFAULT_ID_BASE, DEFAULT_ID_CEILING, DEFAULT_STALE_CLIENT_AFTER};
use huddle_server::{DEFAULT_HOST, DEFAULT_PORT};
use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHuddleConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub hub: RawHubConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    /// Host to bind to
    pub host: Option<String>,

    /// Port for the huddle server
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHubConfig {
    pub id_base: Option<u64>,
    pub id_ceiling: Option<u64>,
    pub stale_client_secs: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HuddleConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub hub: HubSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HubSection {
    /// First identifier handed out
    pub id_base: u64,

    /// Largest identifier before the counter wraps
    pub id_ceiling: u64,

    /// Evict clients this many seconds after they joined; 0 disables eviction
    pub stale_client_secs: u64,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            id_base: DEFAULT_ID_BASE,
            id_ceiling: DEFAULT_ID_CEILING,
            stale_client_secs: DEFAULT_STALE_CLIENT_AFTER.as_secs(),
        }
    }
}

impl HubSection {
    pub fn to_hub_config(&self) -> HubConfig {
        let stale = (self.stale_client_secs > 0).then(|| Duration::from_secs(self.stale_client_secs));
        HubConfig::default()
            .with_id_range(self.id_base, self.id_ceiling)
            .with_stale_client_after(stale)
    }
}
