//! Azure crate - Resource aggregation and search over the Azure CLI
//!
//! This crate provides platform-independent functionality including:
//! - Domain models (Subscription, Resource, HistoryEntry)
//! - The `DirectoryGateway` trait and an `az`-backed implementation
//! - Key-value item stores (in-memory and SQLite)
//! - Resource aggregation with a bulk query and a per-subscription fallback
//! - A pure search/filter engine
//! - History and favorites persistence
//! - A search session with request generations and a lazy aggregate cache
//! - Query views and action handlers for UI consumption
//!
//! This crate has no UI dependencies.

pub mod actions;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod history;
pub mod models;
pub mod query;
pub mod search;
pub mod session;
pub mod storage;

pub use actions::{Confirmation, ResourceActions};
pub use aggregate::{
    AggregationCache, AggregationStats, CacheStatus, FetchOutcome, ResourceAggregator, Strategy,
    bulk_unavailable,
};
pub use config::Settings;
pub use error::{AzResult, AzureError};
pub use favorites::FavoritesRegistry;
pub use gateway::{AzCli, CliStatus, DirectoryGateway, GraphPage, portal_url};
pub use history::{HistoryTracker, MAX_HISTORY_ITEMS};
pub use models::{HistoryEntry, Resource, ResourceId, Subscription, SubscriptionId, short_type};
pub use query::{HomeView, RECENT_HISTORY_LIMIT, RecentItem, ResourceSummary, home_view, summarize};
pub use search::{
    ALL_FILTER, DISPLAY_LIMIT, FieldFilter, SearchOutcome, SearchQuery, distinct_locations,
    distinct_types, search_capped, search_resources,
};
pub use session::{
    RequestGeneration, SearchRequest, SearchResponse, SearchScope, SearchSession, should_load_all,
};
pub use storage::{
    FAVORITES_KEY, HISTORY_KEY, InMemoryItemStore, ItemStore, SqliteItemStore, load_collection,
    save_collection,
};
