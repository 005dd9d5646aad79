//! Storage traits and implementations
//!
//! This module defines the key-value storage primitive that history and
//! favorites are persisted through. The trait-based design allows swapping
//! between in-memory and SQLite-backed storage.

mod collection;
mod memory;
mod sqlite;
mod traits;

pub use collection::{load_collection, save_collection};
pub use memory::InMemoryItemStore;
pub use sqlite::SqliteItemStore;
pub use traits::ItemStore;

/// Storage key holding the JSON-encoded history list
pub const HISTORY_KEY: &str = "azure-resource-history";

/// Storage key holding the JSON-encoded favorites list
pub const FAVORITES_KEY: &str = "azure-resource-favorites";
