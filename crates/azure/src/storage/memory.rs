//! In-memory storage implementation
//!
//! Used for tests and for sessions that should not touch disk.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::RwLock;

use super::ItemStore;

/// In-memory implementation of ItemStore
pub struct InMemoryItemStore {
    items: RwLock<HashMap<String, String>>,
}

impl InMemoryItemStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for InMemoryItemStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().unwrap();
        Ok(items.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().unwrap();
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().unwrap();
        items.remove(key);
        Ok(())
    }
}
