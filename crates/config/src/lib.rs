//! Shared config directory for Nimbus
//!
//! Files live under the platform config dir (`~/.config/nimbus/` on Linux and
//! macOS). `NIMBUS_CONFIG_DIR` points everything at another directory, which
//! tests and throwaway sessions use.
//!
//! Call [`init`] at application startup to bootstrap the directory.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the application directory under the platform config dir
const APP_DIR: &str = "nimbus";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "NIMBUS_CONFIG_DIR";

/// Create the config directory if needed and return it
pub fn init() -> Result<PathBuf> {
    ensure_config_dir()
}

/// The config directory, `None` when the platform has none
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|p| p.join(APP_DIR)),
    }
}

/// Path of `filename` inside the config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Load `filename` from the config directory if it exists
///
/// A missing file (or missing config directory) is `Ok(None)`; an unreadable
/// or malformed file is an error.
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<Option<T>> {
    match config_path(filename) {
        Some(path) => load_json_file_if_exists(&path),
        None => Ok(None),
    }
}

/// Load a JSON file, treating a missing file as `None`
pub fn load_json_file_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read config file: {}", path.display()));
        }
    };
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(Some(value))
}

/// Load a JSON file that must exist
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    load_json_file_if_exists(path)?
        .with_context(|| format!("Config file not found: {}", path.display()))
}

/// Create the config directory if it does not exist
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Write `value` as pretty JSON into the config directory; returns the path
pub fn save_json<T: Serialize>(filename: &str, value: &T) -> Result<PathBuf> {
    let path = ensure_config_dir()?.join(filename);
    save_json_file(&path, value)?;
    Ok(path)
}

/// Write `value` as pretty JSON to `path`
pub fn save_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        limit: u32,
    }

    #[test]
    fn test_config_path_joins_filename() {
        let path = config_path("settings.json").unwrap();
        assert!(path.ends_with("settings.json"));
        assert_eq!(path.parent(), config_dir().as_deref());
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        let value = Sample {
            name: "prod".to_string(),
            limit: 5,
        };

        save_json_file(&path, &value).unwrap();
        let loaded: Sample = load_json_file(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let optional: Option<Sample> = load_json_file_if_exists(&path).unwrap();
        assert!(optional.is_none());

        let required: Result<Sample> = load_json_file(&path);
        assert!(required.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"name\": ").unwrap();

        let result: Result<Option<Sample>> = load_json_file_if_exists(&path);
        assert!(result.is_err());
    }
}
