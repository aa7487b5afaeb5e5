use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{GalleryError, Result};
use crate::paths::GalleryPaths;
use crate::scheduler::{parse_interval, DEFAULT_INTERVAL};

/// Read-only settings. The application never writes this file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub playback: PlaybackConfig,
    /// Raw `[sources.*]` sections; each source crate applies its own defaults.
    pub sources: toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            playback: PlaybackConfig::default(),
            sources: toml::Table::new(),
        }
    }
}

impl Config {
    pub fn load(paths: &GalleryPaths) -> Result<Self> {
        let path = paths.config_file();
        if !path.exists() {
            return Err(GalleryError::FileNotFound(path));
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| GalleryError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &GalleryPaths) -> Self {
        match Self::load(paths) {
            Ok(config) => config,
            Err(GalleryError::FileNotFound(_)) => Self::default(),
            Err(e) => {
                warn!("ignoring config: {e}");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub user_agent: String,
    /// Absent means the HTTP client's own default applies.
    pub request_timeout_secs: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("galleria/", env!("CARGO_PKG_VERSION")).into(),
            request_timeout_secs: None,
        }
    }
}

impl GeneralConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub interval: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval: "2s".into(),
        }
    }
}

impl PlaybackConfig {
    pub fn replacement_interval(&self) -> Duration {
        parse_interval(&self.interval).unwrap_or(DEFAULT_INTERVAL)
    }
}
