//! History entry recording when a resource was last opened

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// A single resource-access event
///
/// Persisted with `accessedAt` as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub resource: Resource,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub accessed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn now(resource: Resource) -> Self {
        Self {
            resource,
            accessed_at: Utc::now(),
        }
    }
}
