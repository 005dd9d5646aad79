//! Pinned resources
//!
//! A set keyed by resource id, persisted in insertion order as a JSON array
//! under [`FAVORITES_KEY`].

use anyhow::Result;
use log::debug;
use std::sync::Arc;

use crate::models::{Resource, ResourceId};
use crate::storage::{FAVORITES_KEY, ItemStore, load_collection, save_collection};

/// Maintains the deduplicated favorites list
pub struct FavoritesRegistry {
    store: Arc<dyn ItemStore>,
}

impl FavoritesRegistry {
    /// Create a registry persisting through `store`
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Pin a resource; no-op if its id is already present
    ///
    /// Returns whether the resource was added.
    pub fn add(&self, resource: Resource) -> Result<bool> {
        let mut favorites = self.list();
        if favorites.iter().any(|f| f.id == resource.id) {
            return Ok(false);
        }
        debug!("Adding favorite {}", resource.id);
        favorites.push(resource);
        save_collection(self.store.as_ref(), FAVORITES_KEY, &favorites)?;
        Ok(true)
    }

    /// Unpin a resource; no-op if absent
    ///
    /// Returns whether a favorite was removed.
    pub fn remove(&self, id: &ResourceId) -> Result<bool> {
        let favorites = self.list();
        let before = favorites.len();
        let remaining: Vec<Resource> = favorites.into_iter().filter(|f| &f.id != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        debug!("Removing favorite {}", id);
        save_collection(self.store.as_ref(), FAVORITES_KEY, &remaining)?;
        Ok(true)
    }

    /// Whether `id` is pinned
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.list().iter().any(|f| &f.id == id)
    }

    /// All favorites in insertion order
    pub fn list(&self) -> Vec<Resource> {
        load_collection(self.store.as_ref(), FAVORITES_KEY)
    }

    /// Add if absent, remove if present; returns the new membership
    pub fn toggle(&self, resource: Resource) -> Result<bool> {
        if self.contains(&resource.id) {
            self.remove(&resource.id)?;
            Ok(false)
        } else {
            self.add(resource)?;
            Ok(true)
        }
    }
}
