//! JSON-encoded list persistence on top of an ItemStore
//!
//! Reads are corruption tolerant: a missing, unreadable or undecodable value
//! loads as an empty list.

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ItemStore;
use crate::error::AzureError;

/// Load the list stored under `key`, treating any failure as empty
pub fn load_collection<T: DeserializeOwned>(store: &dyn ItemStore, key: &str) -> Vec<T> {
    match try_load(store, key) {
        Ok(items) => items,
        Err(err) => {
            warn!("{}; starting from an empty list", err);
            Vec::new()
        }
    }
}

fn try_load<T: DeserializeOwned>(
    store: &dyn ItemStore,
    key: &str,
) -> std::result::Result<Vec<T>, AzureError> {
    let data = store.read(key).map_err(|e| AzureError::CorruptState {
        key: key.to_string(),
        message: format!("{:#}", e),
    })?;

    match data {
        Some(data) if !data.is_empty() => {
            serde_json::from_str(&data).map_err(|e| AzureError::CorruptState {
                key: key.to_string(),
                message: e.to_string(),
            })
        }
        _ => Ok(Vec::new()),
    }
}

/// Replace the list stored under `key`
pub fn save_collection<T: Serialize>(store: &dyn ItemStore, key: &str, items: &[T]) -> Result<()> {
    let data = serde_json::to_string(items)
        .with_context(|| format!("Failed to encode '{}'", key))?;
    store.write(key, &data)
}
