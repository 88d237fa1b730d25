//! Deploy-time settings
//!
//! Settings hold the build/deploy-time defaults of the source priority
//! chain: the default catalog source and the single-container fallback.
//! They are read from `settings.yaml` in the platform config directory; a
//! missing file simply yields defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CatalogError, Result};

/// Settings file name inside the config directory.
pub const SETTINGS_FILE: &str = "settings.yaml";

fn default_cache_ttl_secs() -> u64 {
    300
}

/// Deploy-time configuration for the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Default catalog source id, used when no runtime override is set.
    #[serde(default)]
    pub default_source: Option<String>,

    /// Container id for single-container fallback mode, used when neither
    /// an override nor a default source is configured.
    #[serde(default)]
    pub fallback_container: Option<String>,

    /// Catalog cache TTL in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_source: None,
            fallback_container: None,
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Settings {
    /// Load settings from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Load settings from a specific path; a missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::storage(format!("failed to read {}: {e}", path.display())))?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| CatalogError::storage(format!("failed to parse {}: {e}", path.display())))
    }

    /// Save settings to a specific path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default settings file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE))
    }

    /// Platform config directory, created if necessary.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("", "", "docshelf")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("docshelf")))
            .ok_or_else(|| {
                CatalogError::ConfigLoad("could not determine config directory".into())
            })?;

        std::fs::create_dir_all(&config_dir).map_err(|e| {
            CatalogError::storage(format!(
                "failed to create config directory {}: {e}",
                config_dir.display()
            ))
        })?;

        Ok(config_dir)
    }

    /// The cache TTL as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
