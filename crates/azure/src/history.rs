//! Recently-accessed resources
//!
//! Most-recent-first list with at most one entry per resource id, capped at
//! [`MAX_HISTORY_ITEMS`]. Persisted as a JSON array under [`HISTORY_KEY`].

use anyhow::Result;
use log::{debug, info};
use std::sync::Arc;

use crate::models::{HistoryEntry, Resource};
use crate::storage::{HISTORY_KEY, ItemStore, load_collection, save_collection};

/// Maximum number of retained history entries
pub const MAX_HISTORY_ITEMS: usize = 50;

/// Tracks resource-access events
pub struct HistoryTracker {
    store: Arc<dyn ItemStore>,
}

impl HistoryTracker {
    /// Create a tracker persisting through `store`
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Record that `resource` was just accessed
    ///
    /// An existing entry for the same id is moved to the front with a fresh
    /// timestamp; entries beyond the cap are dropped.
    pub fn record(&self, resource: Resource) -> Result<()> {
        let history = self.list();
        let updated = push_front_dedup(history, HistoryEntry::now(resource));
        debug!("Recorded history entry ({} total)", updated.len());
        save_collection(self.store.as_ref(), HISTORY_KEY, &updated)
    }

    /// All entries, most recent first
    pub fn list(&self) -> Vec<HistoryEntry> {
        load_collection(self.store.as_ref(), HISTORY_KEY)
    }

    /// The `limit` most recent entries
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut history = self.list();
        history.truncate(limit);
        history
    }

    /// Erase the whole history
    ///
    /// Irreversible; callers must obtain explicit confirmation first.
    pub fn clear(&self) -> Result<()> {
        self.store.delete(HISTORY_KEY)?;
        info!("Cleared resource history");
        Ok(())
    }
}

/// Prepend `entry`, removing any older entry for the same id, and cap the list
fn push_front_dedup(history: Vec<HistoryEntry>, entry: HistoryEntry) -> Vec<HistoryEntry> {
    let mut updated = Vec::with_capacity(history.len() + 1);
    let id = entry.resource.id.clone();
    updated.push(entry);
    updated.extend(history.into_iter().filter(|item| item.resource.id != id));
    updated.truncate(MAX_HISTORY_ITEMS);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryItemStore;
    use std::collections::HashSet;

    fn make_resource(n: usize) -> Resource {
        Resource::new(
            format!("/subscriptions/s1/resourceGroups/rg/providers/T/r{}", n),
            format!("r{}", n),
            "Microsoft.Web/sites",
            "rg",
            "japaneast",
            "s1",
        )
    }

    fn tracker() -> (HistoryTracker, Arc<InMemoryItemStore>) {
        let store = Arc::new(InMemoryItemStore::new());
        (HistoryTracker::new(store.clone()), store)
    }

    #[test]
    fn test_record_prepends() {
        let (history, _) = tracker();
        history.record(make_resource(1)).unwrap();
        history.record(make_resource(2)).unwrap();

        let entries = history.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].resource.name, "r2");
        assert_eq!(entries[1].resource.name, "r1");
    }

    #[test]
    fn test_record_existing_moves_to_front() {
        let (history, _) = tracker();
        history.record(make_resource(1)).unwrap();
        history.record(make_resource(2)).unwrap();
        let first_stamp = history.list()[1].accessed_at;

        history.record(make_resource(1)).unwrap();

        let entries = history.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].resource.name, "r1");
        assert!(entries[0].accessed_at >= first_stamp);
    }

    #[test]
    fn test_bounded_and_unique() {
        let (history, _) = tracker();
        for n in 0..60 {
            history.record(make_resource(n % 55)).unwrap();
        }

        let entries = history.list();
        assert_eq!(entries.len(), MAX_HISTORY_ITEMS);
        let ids: HashSet<_> = entries.iter().map(|e| e.resource.id.clone()).collect();
        assert_eq!(ids.len(), entries.len());
        // The last recorded is r4 (59 % 55)
        assert_eq!(entries[0].resource.name, "r4");
    }

    #[test]
    fn test_recent_limits() {
        let (history, _) = tracker();
        for n in 0..8 {
            history.record(make_resource(n)).unwrap();
        }
        let recent = history.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].resource.name, "r7");
    }

    #[test]
    fn test_clear() {
        let (history, store) = tracker();
        history.record(make_resource(1)).unwrap();
        history.clear().unwrap();
        assert!(history.list().is_empty());
        assert!(store.read(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_blob_reads_empty() {
        let (history, store) = tracker();
        store.write(HISTORY_KEY, "\u{0}garbage").unwrap();
        assert!(history.list().is_empty());

        // Recording over corrupt state starts a fresh list
        history.record(make_resource(1)).unwrap();
        assert_eq!(history.list().len(), 1);
    }
}
