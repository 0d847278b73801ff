use super::types::{
    HubSection, HuddleConfig, RawHubConfig, RawHuddleConfig, RawServerConfig, ServerSection,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<HuddleConfig> {
        let mut raw = RawHuddleConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        raw = Self::merge_raw(raw, Self::read_raw(&Self::project_config_path())?);

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "huddle").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with HUDDLE_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("HUDDLE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".huddle/config.toml")
        }
    }

    /// Read one layer; a missing file is an empty layer
    fn read_raw(path: &Path) -> Result<RawHuddleConfig> {
        if !path.exists() {
            return Ok(RawHuddleConfig::default());
        }
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawHuddleConfig, overlay: RawHuddleConfig) -> RawHuddleConfig {
        RawHuddleConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            hub: RawHubConfig {
                id_base: overlay.hub.id_base.or(base.hub.id_base),
                id_ceiling: overlay.hub.id_ceiling.or(base.hub.id_ceiling),
                stale_client_secs: overlay.hub.stale_client_secs.or(base.hub.stale_client_secs),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawHuddleConfig) -> HuddleConfig {
        let server = ServerSection::default();
        let hub = HubSection::default();
        HuddleConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or(server.host),
                port: raw.server.port.unwrap_or(server.port),
            },
            hub: HubSection {
                id_base: raw.hub.id_base.unwrap_or(hub.id_base),
                id_ceiling: raw.hub.id_ceiling.unwrap_or(hub.id_ceiling),
                stale_client_secs: raw.hub.stale_client_secs.unwrap_or(hub.stale_client_secs),
            },
        }
    }
}
