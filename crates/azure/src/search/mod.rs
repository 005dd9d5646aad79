//! Free-text search and structured filtering over resource collections
//!
//! Matching is literal, case-insensitive substring search across name,
//! resource group, type, location, subscription name and rendered tags.
//! Type and location filters are exact, case-sensitive matches.

mod filter;
mod query;

pub use filter::{
    SearchOutcome, distinct_locations, distinct_types, matches_text, search_capped,
    search_resources,
};
pub use query::{ALL_FILTER, FieldFilter, SearchQuery};

/// Matches shown at once when searching across all subscriptions
pub const DISPLAY_LIMIT: usize = 50;
