//! Resource view functions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::favorites::FavoritesRegistry;
use crate::gateway::DirectoryGateway;
use crate::history::HistoryTracker;
use crate::models::{Resource, ResourceId, SubscriptionId};

/// Number of history entries shown on the home view
pub const RECENT_HISTORY_LIMIT: usize = 5;

/// Display row for a resource in a result list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub id: ResourceId,
    pub name: String,
    /// Fully-qualified type
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Last segment of the type, e.g. `virtualMachines`
    pub short_type: String,
    pub resource_group: String,
    pub location: String,
    pub subscription_id: SubscriptionId,
    pub subscription_name: Option<String>,
    /// Tags rendered as `"key: value"` pairs
    pub tags: String,
    pub is_favorite: bool,
    pub portal_url: String,
}

impl ResourceSummary {
    fn new(resource: &Resource, is_favorite: bool, portal_url: String) -> Self {
        Self {
            id: resource.id.clone(),
            name: resource.name.clone(),
            resource_type: resource.resource_type.clone(),
            short_type: resource.short_type().to_string(),
            resource_group: resource.resource_group.clone(),
            location: resource.location.clone(),
            subscription_id: resource.subscription_id.clone(),
            subscription_name: resource.subscription_name.clone(),
            tags: resource.rendered_tags(),
            is_favorite,
            portal_url,
        }
    }
}

/// A history entry ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub resource: ResourceSummary,
    pub accessed_at: DateTime<Utc>,
}

/// What is shown when no search is active
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    /// Most recent first, at most [`RECENT_HISTORY_LIMIT`]
    pub recent: Vec<RecentItem>,
    /// Insertion order
    pub favorites: Vec<ResourceSummary>,
}

/// Annotate resources for display, preserving order
pub fn summarize(
    resources: &[Resource],
    favorites: &FavoritesRegistry,
    gateway: &dyn DirectoryGateway,
) -> Vec<ResourceSummary> {
    let pinned = pinned_ids(favorites);
    resources
        .iter()
        .map(|r| ResourceSummary::new(r, pinned.contains(&r.id), gateway.portal_url(&r.id)))
        .collect()
}

/// Build the home view from history and favorites
pub fn home_view(
    history: &HistoryTracker,
    favorites: &FavoritesRegistry,
    gateway: &dyn DirectoryGateway,
) -> HomeView {
    let pinned_resources = favorites.list();
    let pinned: HashSet<ResourceId> = pinned_resources.iter().map(|r| r.id.clone()).collect();

    let recent = history
        .recent(RECENT_HISTORY_LIMIT)
        .into_iter()
        .map(|entry| RecentItem {
            resource: ResourceSummary::new(
                &entry.resource,
                pinned.contains(&entry.resource.id),
                gateway.portal_url(&entry.resource.id),
            ),
            accessed_at: entry.accessed_at,
        })
        .collect();

    let favorites = pinned_resources
        .iter()
        .map(|r| ResourceSummary::new(r, true, gateway.portal_url(&r.id)))
        .collect();

    HomeView { recent, favorites }
}

fn pinned_ids(favorites: &FavoritesRegistry) -> HashSet<ResourceId> {
    favorites.list().into_iter().map(|r| r.id).collect()
}
