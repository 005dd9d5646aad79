//! Strategy outcomes and the bulk-availability decision

use crate::models::Resource;

/// Which retrieval path produced an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One paginated Resource Graph query
    Bulk,
    /// Sequential per-subscription listing
    Fallback,
}

/// Tagged result of an aggregation attempt
///
/// Collapsed to a plain resource list at the aggregator boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Bulk(Vec<Resource>),
    Fallback(Vec<Resource>),
    /// Every subscription failed during fallback
    Failed,
}

impl FetchOutcome {
    /// Collapse to the resources obtained; `Failed` yields none
    pub fn into_resources(self) -> Vec<Resource> {
        match self {
            FetchOutcome::Bulk(resources) | FetchOutcome::Fallback(resources) => resources,
            FetchOutcome::Failed => Vec::new(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            FetchOutcome::Bulk(_) => Strategy::Bulk,
            FetchOutcome::Fallback(_) | FetchOutcome::Failed => Strategy::Fallback,
        }
    }
}

/// Whether the bulk path must be treated as unavailable
///
/// Zero non-empty pages for a non-empty subscription set counts as
/// unavailable. This cannot tell "no resources anywhere" apart from "graph
/// service disabled"; the fallback then confirms the empty result.
pub fn bulk_unavailable(subscriptions_requested: usize, pages: usize) -> bool {
    subscriptions_requested > 0 && pages == 0
}

/// Statistics from one aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationStats {
    /// Path that produced the result
    pub strategy: Strategy,
    /// Number of subscriptions asked for
    pub subscriptions_requested: usize,
    /// Subscriptions that failed during fallback and contributed nothing
    pub subscriptions_failed: usize,
    /// Non-empty bulk pages received
    pub pages: usize,
    /// Resources in the final aggregate
    pub resources: usize,
    /// Why the bulk path was abandoned, if it was
    pub bulk_error: Option<String>,
    /// Duration of the whole run
    pub duration_ms: u64,
}

impl AggregationStats {
    pub(crate) fn new(subscriptions_requested: usize) -> Self {
        Self {
            strategy: Strategy::Bulk,
            subscriptions_requested,
            subscriptions_failed: 0,
            pages: 0,
            resources: 0,
            bulk_error: None,
            duration_ms: 0,
        }
    }
}
