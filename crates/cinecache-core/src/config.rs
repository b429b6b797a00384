//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! catalog endpoints, the API key, offline mode, and the last used login.
//!
//! Configuration is stored at `~/.config/cinecache/config.json`.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_API_BASE_URL;
use crate::images::DEFAULT_IMAGE_BASE_URL;

/// Application name used for config/cache/data directory paths
const APP_NAME: &str = "cinecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_image_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub offline_mode: bool,
    #[serde(default)]
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            image_base_url: default_image_base_url(),
            api_key: None,
            offline_mode: false,
            last_username: None,
        }
    }
}

/// `<base>/cinecache`, or an error naming the missing platform directory.
fn app_dir(base: Option<PathBuf>, kind: &str) -> Result<PathBuf> {
    base.map(|dir| dir.join(APP_NAME))
        .with_context(|| format!("Could not determine the {} directory", kind))
}

impl Config {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
        };
        serde_json::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(app_dir(dirs::config_dir(), "config")?.join(CONFIG_FILE))
    }

    /// Where fetched pages are kept for offline use
    pub fn cache_dir(&self) -> Result<PathBuf> {
        app_dir(dirs::cache_dir(), "cache")
    }

    /// Where favorites, preferences and the session are kept
    pub fn data_dir(&self) -> Result<PathBuf> {
        app_dir(dirs::data_dir(), "data")
    }
}
