//! Storage trait definitions

use anyhow::Result;

/// Trait for durable string storage keyed by namespace
///
/// Writes replace the whole value; callers do read-modify-write cycles under
/// a single-writer assumption.
pub trait ItemStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn delete(&self, key: &str) -> Result<()>;
}
