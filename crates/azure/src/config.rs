//! Runtime settings for the Azure gateway and local stores
//!
//! Settings are resolved in order of priority:
//! 1. Environment variables (`NIMBUS_AZ_PATH`, `NIMBUS_GRAPH_PAGE_SIZE`)
//! 2. JSON file (~/.config/nimbus/settings.json)
//! 3. Built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings filename in the Nimbus config directory
const SETTINGS_FILE: &str = "settings.json";

/// Resource Graph rejects `--first` values above this
pub const MAX_GRAPH_PAGE_SIZE: u32 = 1000;

/// Settings for locating `az` and persisting local state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path or name of the `az` executable
    pub az_path: String,
    /// Directories prepended to PATH for every `az` invocation
    pub extra_path: Vec<String>,
    /// Records requested per Resource Graph page
    pub graph_page_size: u32,
    /// SQLite file (relative to the config dir) for history and favorites
    pub store_file: String,
    /// Base URL of the Azure portal
    pub portal_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            az_path: "az".to_string(),
            extra_path: ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin", "/bin"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            graph_page_size: MAX_GRAPH_PAGE_SIZE,
            store_file: "nimbus.sqlite".to_string(),
            portal_base_url: "https://portal.azure.com".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the config directory, then apply env overrides
    ///
    /// A missing settings file yields defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        let settings: Settings = config::load_json(SETTINGS_FILE)?.unwrap_or_default();
        settings.with_env_overrides()
    }

    /// Write default settings to the config directory unless a file exists
    ///
    /// Returns the settings file path and whether it was created.
    pub fn write_default() -> Result<(PathBuf, bool)> {
        if let Some(path) = Self::default_settings_path() {
            if path.exists() {
                return Ok((path, false));
            }
        }
        let path = config::save_json(SETTINGS_FILE, &Self::default())?;
        Ok((path, true))
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings: Settings = config::load_json_file(path)?;
        Ok(settings.normalized())
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(json).context("Failed to parse settings JSON")?;
        Ok(settings.normalized())
    }

    /// Apply `NIMBUS_*` environment variable overrides
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(path) = std::env::var("NIMBUS_AZ_PATH") {
            if !path.is_empty() {
                self.az_path = path;
            }
        }
        if let Ok(size) = std::env::var("NIMBUS_GRAPH_PAGE_SIZE") {
            self.graph_page_size = size
                .parse()
                .with_context(|| format!("NIMBUS_GRAPH_PAGE_SIZE is not a number: {}", size))?;
        }
        Ok(self.normalized())
    }

    /// Clamp values into the ranges `az` accepts
    fn normalized(mut self) -> Self {
        self.graph_page_size = self.graph_page_size.clamp(1, MAX_GRAPH_PAGE_SIZE);
        self
    }

    /// Absolute path of the SQLite store, if the config dir is known
    pub fn store_path(&self) -> Option<PathBuf> {
        config::config_path(&self.store_file)
    }

    /// Default settings file path (~/.config/nimbus/settings.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(SETTINGS_FILE)
    }
}
