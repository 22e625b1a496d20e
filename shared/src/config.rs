use serde::{Deserialize, Serialize};

use crate::api::api_url;
use crate::geo::{TileSource, DEFAULT_ZOOM};

pub const DEFAULT_TILE_CACHE_PATH: &str = "tiles";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;
const MAX_ZOOM: u8 = 19;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

// ===== FILE FORMAT =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub map: MapSection,
}

// Versioning metadata for future format changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSection {
    pub version: String,
}

impl AppSection {
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn is_supported_version(&self) -> bool {
        self.version == Self::CURRENT_VERSION
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ServerSection {
    /// Base URL of the telemetry API; empty means same origin as the page.
    #[serde(default)]
    pub api_base_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Probe the public tile server once at startup.
    #[default]
    Auto,
    Online,
    Offline,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MapSection {
    #[serde(default)]
    pub mode: MapMode,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default = "default_tile_cache_path")]
    pub tile_cache_path: String,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            mode: MapMode::default(),
            default_zoom: DEFAULT_ZOOM,
            tile_cache_path: DEFAULT_TILE_CACHE_PATH.to_string(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_tile_cache_path() -> String {
    DEFAULT_TILE_CACHE_PATH.to_string()
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

impl DashboardConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|error| ConfigError::Parse(error.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|error| ConfigError::Serialize(error.to_string()))
    }

    /// Repair out-of-range values in place. Returns one message per fix; an
    /// empty list means the config was already valid.
    pub fn validate_and_fix(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();

        if !self.app.is_supported_version() {
            fixes.push(format!(
                "unsupported config version '{}', reset to defaults",
                self.app.version
            ));
            *self = Self::default();
            return fixes;
        }

        if self.map.default_zoom > MAX_ZOOM {
            fixes.push(format!(
                "default_zoom {} above {}, clamped",
                self.map.default_zoom, MAX_ZOOM
            ));
            self.map.default_zoom = MAX_ZOOM;
        }

        let trimmed = self.server.api_base_url.trim().trim_end_matches('/').to_string();
        if trimmed != self.server.api_base_url {
            fixes.push(format!("api_base_url normalized to '{}'", trimmed));
            self.server.api_base_url = trimmed;
        }

        let cache_path = self.map.tile_cache_path.trim().trim_end_matches('/');
        if cache_path.is_empty() {
            fixes.push("empty tile_cache_path replaced with default".to_string());
            self.map.tile_cache_path = DEFAULT_TILE_CACHE_PATH.to_string();
        } else if cache_path != self.map.tile_cache_path {
            fixes.push(format!("tile_cache_path normalized to '{}'", cache_path));
            self.map.tile_cache_path = cache_path.to_string();
        }

        if self.map.probe_timeout_ms == 0 {
            fixes.push("probe_timeout_ms must be positive, reset to default".to_string());
            self.map.probe_timeout_ms = DEFAULT_PROBE_TIMEOUT_MS;
        }

        fixes
    }

    /// Settings handed to the browser once the map mode is resolved.
    pub fn client_config(&self, online: bool) -> ClientConfig {
        ClientConfig {
            online,
            api_base_url: self.server.api_base_url.clone(),
            default_zoom: self.map.default_zoom,
            tile_cache_path: self.map.tile_cache_path.clone(),
        }
    }
}

// ===== SENT TO THE BROWSER =====

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub online: bool,
    pub api_base_url: String,
    pub default_zoom: u8,
    pub tile_cache_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        DashboardConfig::default().client_config(true)
    }
}

impl ClientConfig {
    pub fn tile_source(&self) -> TileSource {
        if self.online {
            TileSource::Online
        } else {
            let cache_path = format!("/{}", self.tile_cache_path.trim_matches('/'));
            TileSource::Offline {
                cache_path: api_url(&self.api_base_url, &cache_path),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::TileCoord;

    #[test]
    fn missing_sections_use_defaults() {
        let config = DashboardConfig::from_toml("[map]\nmode = \"offline\"\n").unwrap();
        assert_eq!(config.map.mode, MapMode::Offline);
        assert_eq!(config.map.default_zoom, DEFAULT_ZOOM);
        assert_eq!(config.app.version, AppSection::CURRENT_VERSION);
        assert!(config.server.api_base_url.is_empty());
    }

    #[test]
    fn default_config_survives_toml() {
        let config = DashboardConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("mode = \"auto\""));
        assert_eq!(DashboardConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn rejects_unknown_map_mode() {
        let error = DashboardConfig::from_toml("[map]\nmode = \"satellite\"\n").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn validate_and_fix_repairs_values() {
        let mut config = DashboardConfig::from_toml(
            "[server]\napi_base_url = \" http://boat.local:5000/ \"\n\
             [map]\ndefault_zoom = 25\ntile_cache_path = \"\"\nprobe_timeout_ms = 0\n",
        )
        .unwrap();
        let fixes = config.validate_and_fix();
        assert_eq!(fixes.len(), 4);
        assert_eq!(config.server.api_base_url, "http://boat.local:5000");
        assert_eq!(config.map.default_zoom, 19);
        assert_eq!(config.map.tile_cache_path, DEFAULT_TILE_CACHE_PATH);
        assert_eq!(config.map.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
        assert!(config.validate_and_fix().is_empty());
    }

    #[test]
    fn unsupported_version_resets_config() {
        let mut config =
            DashboardConfig::from_toml("[app]\nversion = \"0.1\"\n[map]\nmode = \"online\"\n").unwrap();
        let fixes = config.validate_and_fix();
        assert_eq!(fixes.len(), 1);
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn client_config_selects_tile_source() {
        let config = DashboardConfig::default();
        assert_eq!(config.client_config(true).tile_source(), TileSource::Online);
        assert_eq!(
            config.client_config(false).tile_source(),
            TileSource::Offline {
                cache_path: "/tiles".to_string()
            }
        );
    }

    #[test]
    fn offline_tiles_come_from_the_telemetry_server() {
        let mut config = DashboardConfig::default();
        config.server.api_base_url = "http://boat.local:5000".to_string();
        let url = config
            .client_config(false)
            .tile_source()
            .url(TileCoord { z: 3, x: 4, y: 2 });
        assert_eq!(url, "http://boat.local:5000/tiles/3/4/2.png");
    }
}
