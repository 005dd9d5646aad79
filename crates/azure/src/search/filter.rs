//! Filter engine: pure functions over resource slices

use std::collections::BTreeSet;

use super::SearchQuery;
use crate::models::Resource;

/// Result of a capped search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Matches to display, in input order
    pub resources: Vec<Resource>,
    /// Number of matches before capping
    pub total_matches: usize,
}

impl SearchOutcome {
    /// Whether some matches were cut off by the display cap
    pub fn is_truncated(&self) -> bool {
        self.total_matches > self.resources.len()
    }
}

/// Case-insensitive substring match of `needle` against the searchable fields
///
/// `needle` must already be lowercased. An empty needle matches everything.
pub fn matches_text(resource: &Resource, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&resource.name)
        || contains(&resource.resource_group)
        || contains(&resource.resource_type)
        || contains(&resource.location)
        || resource.subscription_name.as_deref().is_some_and(contains)
        || contains(&resource.rendered_tags())
}

fn matches_query(resource: &Resource, needle: &str, query: &SearchQuery) -> bool {
    query.type_filter.matches(&resource.resource_type)
        && query.location_filter.matches(&resource.location)
        && matches_text(resource, needle)
}

/// Resources matching text AND type AND location, in input order
pub fn search_resources(resources: &[Resource], query: &SearchQuery) -> Vec<Resource> {
    let needle = query.text.to_lowercase();
    resources
        .iter()
        .filter(|r| matches_query(r, &needle, query))
        .cloned()
        .collect()
}

/// Like [`search_resources`] but keeps only the first `limit` matches
pub fn search_capped(resources: &[Resource], query: &SearchQuery, limit: usize) -> SearchOutcome {
    let needle = query.text.to_lowercase();
    let mut outcome = SearchOutcome::default();
    for resource in resources.iter().filter(|r| matches_query(r, &needle, query)) {
        if outcome.resources.len() < limit {
            outcome.resources.push(resource.clone());
        }
        outcome.total_matches += 1;
    }
    outcome
}

/// Sorted distinct resource types, for the type filter choices
pub fn distinct_types(resources: &[Resource]) -> Vec<String> {
    distinct(resources.iter().map(|r| r.resource_type.as_str()))
}

/// Sorted distinct locations, for the location filter choices
pub fn distinct_locations(resources: &[Resource]) -> Vec<String> {
    distinct(resources.iter().map(|r| r.location.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
