//! Query API for UI consumption
//!
//! Provides view models that combine resources with favorites, history and
//! portal links, formatted for display.

mod resources;

pub use resources::{HomeView, RECENT_HISTORY_LIMIT, RecentItem, ResourceSummary, home_view, summarize};
