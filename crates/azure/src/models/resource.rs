//! Resource model representing a single Azure resource

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SubscriptionId;

/// Provider-assigned resource ID
///
/// The full ARM path, e.g.
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{type}/{name}`.
/// This is the natural key for equality, favorites and history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A read-only snapshot of an Azure resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    /// Fully-qualified type, e.g. `Microsoft.Compute/virtualMachines`
    #[serde(rename = "type")]
    pub resource_type: String,
    pub resource_group: String,
    pub location: String,
    pub subscription_id: SubscriptionId,
    /// Display name of the owning subscription, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl Resource {
    /// Create a resource without subscription name or tags
    pub fn new(
        id: impl Into<ResourceId>,
        name: impl Into<String>,
        resource_type: impl Into<String>,
        resource_group: impl Into<String>,
        location: impl Into<String>,
        subscription_id: impl Into<SubscriptionId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_type: resource_type.into(),
            resource_group: resource_group.into(),
            location: location.into(),
            subscription_id: subscription_id.into(),
            subscription_name: None,
            tags: None,
        }
    }

    /// Annotate with the owning subscription's display name
    pub fn with_subscription_name(mut self, name: impl Into<String>) -> Self {
        self.subscription_name = Some(name.into());
        self
    }

    /// Add a single tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the tag map
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Render tags as `"key: value"` pairs joined by `", "`
    ///
    /// Absent or empty tags render to an empty string.
    pub fn rendered_tags(&self) -> String {
        match &self.tags {
            Some(tags) => tags
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join(", "),
            None => String::new(),
        }
    }

    /// Last segment of the resource type, used as a compact label
    pub fn short_type(&self) -> &str {
        short_type(&self.resource_type)
    }
}

/// Last `/`-separated segment of a resource type
pub fn short_type(resource_type: &str) -> &str {
    resource_type.rsplit('/').next().unwrap_or(resource_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm() -> Resource {
        Resource::new(
            "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1",
            "vm1",
            "Microsoft.Compute/virtualMachines",
            "rg",
            "japaneast",
            "s1",
        )
    }

    #[test]
    fn test_rendered_tags() {
        let resource = vm().with_tag("env", "prod").with_tag("owner", "team-a");
        assert_eq!(resource.rendered_tags(), "env: prod, owner: team-a");
    }

    #[test]
    fn test_rendered_tags_empty() {
        assert_eq!(vm().rendered_tags(), "");
        assert_eq!(vm().with_tags(BTreeMap::new()).rendered_tags(), "");
    }

    #[test]
    fn test_short_type() {
        assert_eq!(vm().short_type(), "virtualMachines");
        assert_eq!(short_type("plain"), "plain");
        assert_eq!(short_type(""), "");
    }

    #[test]
    fn test_json_layout() {
        let resource = vm().with_subscription_name("Production");
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "Microsoft.Compute/virtualMachines");
        assert_eq!(json["resourceGroup"], "rg");
        assert_eq!(json["subscriptionId"], "s1");
        assert_eq!(json["subscriptionName"], "Production");
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_null_tags_deserialize() {
        let json = r#"{
            "id": "/x", "name": "x", "type": "t", "resourceGroup": "rg",
            "location": "eastus", "subscriptionId": "s1", "tags": null
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert!(resource.tags.is_none());
        assert!(resource.subscription_name.is_none());
    }
}
