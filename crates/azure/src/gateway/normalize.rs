//! Normalization of raw `az` records to domain models

use std::collections::BTreeMap;

use super::api::{AccountEntry, GraphRow, RawResource};
use crate::models::{Resource, Subscription, SubscriptionId};

/// Convert an `az account list` entry
pub fn normalize_subscription(entry: AccountEntry) -> Subscription {
    Subscription {
        id: SubscriptionId::new(entry.id),
        name: entry.name,
        state: entry.state.unwrap_or_default(),
        is_default: entry.is_default,
    }
}

/// Convert an `az resource list` entry belonging to a known subscription
pub fn normalize_resource(
    raw: RawResource,
    subscription_id: &SubscriptionId,
    subscription_name: &str,
) -> Resource {
    Resource {
        id: raw.id.into(),
        name: raw.name,
        resource_type: raw.resource_type,
        resource_group: raw.resource_group.unwrap_or_default(),
        location: raw.location.unwrap_or_default(),
        subscription_id: subscription_id.clone(),
        subscription_name: Some(subscription_name.to_string()),
        tags: normalize_tags(raw.tags),
    }
}

/// Convert a Resource Graph row
///
/// The subscription name is filled in later by the aggregator.
pub fn normalize_graph_row(row: GraphRow) -> Resource {
    Resource {
        id: row.id.into(),
        name: row.name,
        resource_type: row.resource_type,
        resource_group: row.resource_group.unwrap_or_default(),
        location: row.location.unwrap_or_default(),
        subscription_id: SubscriptionId::new(row.subscription_id),
        subscription_name: None,
        tags: normalize_tags(row.tags),
    }
}

/// Flatten tag values to strings
///
/// Graph rows occasionally carry non-string JSON values; `null` becomes an
/// empty string and other values their JSON text.
pub fn normalize_tags(
    tags: Option<BTreeMap<String, serde_json::Value>>,
) -> Option<BTreeMap<String, String>> {
    let tags = tags?;
    Some(
        tags.into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
    )
}
