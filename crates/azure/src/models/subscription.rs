//! Subscription model representing an Azure subscription

use serde::{Deserialize, Serialize};

/// Unique identifier for a subscription (Azure subscription GUID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SubscriptionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SubscriptionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A subscription visible to the signed-in account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription ID
    pub id: SubscriptionId,
    /// Display name
    pub name: String,
    /// Provider-reported state (e.g. "Enabled", "Disabled")
    pub state: String,
    /// Whether this is the CLI's default subscription
    #[serde(default)]
    pub is_default: bool,
}

impl Subscription {
    /// Create an enabled, non-default subscription
    pub fn new(id: impl Into<SubscriptionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: "Enabled".to_string(),
            is_default: false,
        }
    }

    /// Set the provider state
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set as the default subscription
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_new() {
        let sub = Subscription::new("sub-1", "Production");
        assert_eq!(sub.id.as_str(), "sub-1");
        assert_eq!(sub.name, "Production");
        assert_eq!(sub.state, "Enabled");
        assert!(!sub.is_default);
    }

    #[test]
    fn test_deserialize_cli_shape() {
        let json = r#"{
            "id": "0000-1111",
            "name": "Dev",
            "state": "Enabled",
            "isDefault": true,
            "tenantId": "ignored"
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.id, SubscriptionId::new("0000-1111"));
        assert!(sub.is_default);
    }
}
