//! Azure CLI integration
//!
//! This module provides:
//! - The `DirectoryGateway` trait the aggregator talks to
//! - An `az`-backed implementation that shells out and decodes JSON
//! - Normalization of raw CLI records to domain models

mod cli;
mod normalize;
#[cfg(test)]
pub(crate) mod testing;

pub use cli::AzCli;
pub use normalize::{normalize_graph_row, normalize_resource, normalize_subscription, normalize_tags};

use crate::error::AzResult;
use crate::models::{Resource, ResourceId, Subscription, SubscriptionId};

/// Result of probing for the CLI and a signed-in account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CliStatus {
    pub installed: bool,
    pub logged_in: bool,
}

impl CliStatus {
    /// Both installed and logged in
    pub fn ready() -> Self {
        Self {
            installed: true,
            logged_in: true,
        }
    }
}

/// One page of a Resource Graph query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphPage {
    /// Resources on this page, not yet annotated with subscription names
    pub resources: Vec<Resource>,
    /// Continuation token; `None` on the last page
    pub skip_token: Option<String>,
}

impl GraphPage {
    /// Whether this page carries no records at all
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Trait for the external directory the resources come from
///
/// Every call may be slow (seconds); none of them are preemptible.
pub trait DirectoryGateway: Send + Sync {
    /// Probe whether the CLI is installed and has a signed-in account
    fn check_availability(&self) -> CliStatus;

    /// List subscriptions visible to the signed-in account
    fn list_subscriptions(&self) -> AzResult<Vec<Subscription>>;

    /// List every resource in one subscription
    ///
    /// Returned resources carry `subscription_name` already.
    fn list_resources(
        &self,
        subscription_id: &SubscriptionId,
        subscription_name: &str,
    ) -> AzResult<Vec<Resource>>;

    /// Fetch one page of the bulk Resource Graph query
    ///
    /// An empty first page means the bulk path is unavailable.
    fn query_resources_page(
        &self,
        subscription_ids: &[SubscriptionId],
        skip_token: Option<&str>,
    ) -> AzResult<GraphPage>;

    /// Make `id` the CLI's default subscription
    fn set_default_subscription(&self, id: &SubscriptionId) -> AzResult<()>;

    /// Portal URL for a resource (pure formatting, no I/O)
    fn portal_url(&self, resource_id: &ResourceId) -> String {
        portal_url(DEFAULT_PORTAL_BASE_URL, resource_id)
    }
}

/// Public Azure portal
pub const DEFAULT_PORTAL_BASE_URL: &str = "https://portal.azure.com";

/// Build the portal deep link for a resource
pub fn portal_url(base_url: &str, resource_id: &ResourceId) -> String {
    format!(
        "{}/#@/resource{}",
        base_url.trim_end_matches('/'),
        resource_id.as_str()
    )
}

/// Raw `az` JSON response types
pub mod api {
    use serde::Deserialize;
    use std::collections::BTreeMap;

    /// Entry of `az account list`
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountEntry {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub state: Option<String>,
        #[serde(default)]
        pub is_default: bool,
    }

    /// Entry of `az resource list`
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RawResource {
        pub id: String,
        pub name: String,
        #[serde(rename = "type")]
        pub resource_type: String,
        #[serde(default)]
        pub resource_group: Option<String>,
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub tags: Option<BTreeMap<String, serde_json::Value>>,
    }

    /// Response of `az graph query`
    #[derive(Debug, Deserialize)]
    pub struct GraphResponse {
        #[serde(default)]
        pub count: Option<u64>,
        #[serde(default)]
        pub data: Vec<GraphRow>,
        #[serde(default, alias = "$skipToken", alias = "skipToken")]
        pub skip_token: Option<String>,
        #[serde(default)]
        pub total_records: Option<u64>,
    }

    /// Row projected by the Resource Graph query
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GraphRow {
        pub id: String,
        pub name: String,
        #[serde(rename = "type")]
        pub resource_type: String,
        #[serde(default)]
        pub resource_group: Option<String>,
        #[serde(default)]
        pub location: Option<String>,
        pub subscription_id: String,
        #[serde(default)]
        pub tags: Option<BTreeMap<String, serde_json::Value>>,
    }
}
