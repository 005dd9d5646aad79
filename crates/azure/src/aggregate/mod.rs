//! Cross-subscription resource aggregation
//!
//! Provides the dual-strategy fetch (bulk Resource Graph query with a
//! per-subscription fallback) and the session cache of all resources.

mod aggregator;
mod cache;
mod strategy;

pub use aggregator::ResourceAggregator;
pub use cache::{AggregationCache, CacheStatus};
pub use strategy::{AggregationStats, FetchOutcome, Strategy, bulk_unavailable};
