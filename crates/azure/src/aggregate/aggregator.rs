//! Resource aggregator
//!
//! Chooses between the bulk Resource Graph query and a sequential
//! per-subscription listing, and owns the session cache of all resources.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::{debug, info, warn};

use super::cache::{AggregationCache, CacheStatus};
use super::strategy::{AggregationStats, FetchOutcome, bulk_unavailable};
use crate::error::{AzResult, AzureError};
use crate::gateway::DirectoryGateway;
use crate::models::{Resource, ResourceId, Subscription, SubscriptionId};

/// Resources gathered by the bulk path
struct BulkFetch {
    resources: Vec<Resource>,
    pages: usize,
}

/// Supplies resource collections from the gateway or the session cache
pub struct ResourceAggregator {
    gateway: Arc<dyn DirectoryGateway>,
    cache: AggregationCache,
    last_stats: Mutex<Option<AggregationStats>>,
}

impl ResourceAggregator {
    /// Create an aggregator with a cold cache
    pub fn new(gateway: Arc<dyn DirectoryGateway>) -> Self {
        Self {
            gateway,
            cache: AggregationCache::new(),
            last_stats: Mutex::new(None),
        }
    }

    /// The gateway this aggregator talks to
    pub fn gateway(&self) -> &dyn DirectoryGateway {
        self.gateway.as_ref()
    }

    /// List subscriptions; callers check availability first
    pub fn list_subscriptions(&self) -> AzResult<Vec<Subscription>> {
        self.gateway.list_subscriptions()
    }

    /// List resources of one subscription; fails without partial results
    pub fn list_resources(&self, subscription: &Subscription) -> AzResult<Vec<Resource>> {
        self.gateway
            .list_resources(&subscription.id, &subscription.name)
    }

    /// Issue the change-default command
    ///
    /// Nothing is re-fetched; callers mirror the flag in their own copies.
    pub fn set_default_subscription(&self, id: &SubscriptionId) -> AzResult<()> {
        self.gateway.set_default_subscription(id)?;
        info!("Default subscription set to {}", id);
        Ok(())
    }

    /// Portal URL for a resource
    pub fn portal_url(&self, resource_id: &ResourceId) -> String {
        self.gateway.portal_url(resource_id)
    }

    /// Fetch every resource across `subscriptions`, uncached
    ///
    /// Never fails: bulk errors trigger the fallback, and failing
    /// subscriptions in the fallback contribute no resources.
    pub fn aggregate_all(&self, subscriptions: &[Subscription]) -> Vec<Resource> {
        self.aggregate_with_stats(subscriptions).0
    }

    /// Like [`aggregate_all`](Self::aggregate_all), also returning statistics
    pub fn aggregate_with_stats(
        &self,
        subscriptions: &[Subscription],
    ) -> (Vec<Resource>, AggregationStats) {
        let start = Instant::now();
        let mut stats = AggregationStats::new(subscriptions.len());

        let outcome = self.fetch(subscriptions, &mut stats);
        stats.strategy = outcome.strategy();
        let resources = outcome.into_resources();

        stats.resources = resources.len();
        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Aggregated {} resources from {} subscriptions via {:?} in {}ms ({} failed)",
            stats.resources,
            stats.subscriptions_requested,
            stats.strategy,
            stats.duration_ms,
            stats.subscriptions_failed
        );

        *self.last_stats.lock().unwrap() = Some(stats.clone());
        (resources, stats)
    }

    /// All resources for the session, loading them on first use
    ///
    /// An empty subscription list yields an empty result without touching
    /// the cache, so a later call with real subscriptions still loads.
    pub fn all_resources(&self, subscriptions: &[Subscription]) -> Arc<Vec<Resource>> {
        if subscriptions.is_empty() {
            debug!("No subscriptions to aggregate");
            return self.cache.get().unwrap_or_default();
        }
        self.cache
            .get_or_load(|| self.aggregate_all(subscriptions))
    }

    /// The cached aggregate, if it has been loaded
    pub fn cached_resources(&self) -> Option<Arc<Vec<Resource>>> {
        self.cache.get()
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }

    /// Statistics of the most recent aggregation run
    pub fn last_stats(&self) -> Option<AggregationStats> {
        self.last_stats.lock().unwrap().clone()
    }

    fn fetch(&self, subscriptions: &[Subscription], stats: &mut AggregationStats) -> FetchOutcome {
        match self.fetch_bulk(subscriptions) {
            Ok(bulk) if !bulk_unavailable(subscriptions.len(), bulk.pages) => {
                stats.pages = bulk.pages;
                return FetchOutcome::Bulk(annotate(bulk.resources, subscriptions));
            }
            Ok(_) => {
                info!("Bulk query returned no pages, falling back to per-subscription listing");
                stats.bulk_error = Some("no pages returned".to_string());
            }
            Err(e) => {
                warn!("Bulk query failed, falling back to per-subscription listing: {}", e);
                stats.bulk_error = Some(e.to_string());
            }
        }

        self.fetch_sequential(subscriptions, stats)
    }

    /// Follow skip tokens until the last page
    fn fetch_bulk(&self, subscriptions: &[Subscription]) -> Result<BulkFetch, AzureError> {
        let ids: Vec<SubscriptionId> = subscriptions.iter().map(|s| s.id.clone()).collect();
        let mut resources = Vec::new();
        let mut pages = 0;
        let mut skip_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let page = self
                .gateway
                .query_resources_page(&ids, skip_token.as_deref())?;

            if !page.is_empty() {
                pages += 1;
                resources.extend(page.resources);
            }
            debug!("Bulk page {}: {} resources so far", pages, resources.len());

            match page.skip_token {
                Some(token) => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(AzureError::gateway(
                            "graph query",
                            format!("skip token repeated after {} pages", pages),
                        ));
                    }
                    skip_token = Some(token);
                }
                None => break,
            }
        }

        Ok(BulkFetch { resources, pages })
    }

    fn fetch_sequential(
        &self,
        subscriptions: &[Subscription],
        stats: &mut AggregationStats,
    ) -> FetchOutcome {
        let mut resources = Vec::new();

        for subscription in subscriptions {
            match self.list_resources(subscription) {
                Ok(found) => resources.extend(found),
                Err(e) => {
                    warn!(
                        "Skipping subscription {} ({}): {}",
                        subscription.name, subscription.id, e
                    );
                    stats.subscriptions_failed += 1;
                }
            }
        }

        if !subscriptions.is_empty() && stats.subscriptions_failed == subscriptions.len() {
            return FetchOutcome::Failed;
        }
        FetchOutcome::Fallback(resources)
    }
}

/// Fill in subscription display names on bulk results
fn annotate(resources: Vec<Resource>, subscriptions: &[Subscription]) -> Vec<Resource> {
    let names: HashMap<String, &str> = subscriptions
        .iter()
        .map(|s| (s.id.as_str().to_ascii_lowercase(), s.name.as_str()))
        .collect();

    resources
        .into_iter()
        .map(|mut resource| {
            if let Some(name) = names.get(&resource.subscription_id.as_str().to_ascii_lowercase()) {
                resource.subscription_name = Some(name.to_string());
            }
            resource
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GraphPage;
    use crate::aggregate::Strategy;
    use crate::gateway::testing::ScriptedGateway;

    fn make_resource(name: &str, subscription: &str) -> Resource {
        Resource::new(
            format!("/subscriptions/{}/resourceGroups/rg/providers/T/{}", subscription, name),
            name,
            "Microsoft.Web/sites",
            "rg",
            "japaneast",
            subscription,
        )
    }

    fn subscriptions() -> Vec<Subscription> {
        vec![
            Subscription::new("s1", "Production"),
            Subscription::new("s2", "Staging"),
            Subscription::new("s3", "Sandbox"),
        ]
    }

    fn page(resources: Vec<Resource>, token: Option<&str>) -> GraphPage {
        GraphPage {
            resources,
            skip_token: token.map(str::to_string),
        }
    }

    fn names(resources: &[Resource]) -> Vec<&str> {
        resources.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_bulk_pagination_accumulates_pages() {
        let gateway = ScriptedGateway::new()
            .with_graph_page(Ok(page(vec![make_resource("a", "s1")], Some("t1"))))
            .with_graph_page(Ok(page(vec![make_resource("b", "S2")], Some("t2"))))
            .with_graph_page(Ok(page(vec![make_resource("c", "s3")], None)));
        let gateway = Arc::new(gateway);
        let aggregator = ResourceAggregator::new(gateway.clone());

        let (resources, stats) = aggregator.aggregate_with_stats(&subscriptions());

        assert_eq!(names(&resources), vec!["a", "b", "c"]);
        assert_eq!(stats.strategy, Strategy::Bulk);
        assert_eq!(stats.pages, 3);
        assert_eq!(gateway.graph_count(), 3);
        assert_eq!(gateway.list_resources_count(), 0);
        // Subscription ids are matched case-insensitively
        assert_eq!(resources[1].subscription_name.as_deref(), Some("Staging"));
        assert_eq!(resources[2].subscription_name.as_deref(), Some("Sandbox"));
    }

    #[test]
    fn test_zero_pages_falls_back_with_partial_failure() {
        let gateway = ScriptedGateway::new()
            .with_graph_page(Ok(GraphPage::default()))
            .with_resources("s1", vec![make_resource("a", "s1"), make_resource("b", "s1")])
            .with_failing_subscription("s2")
            .with_resources("s3", vec![make_resource("c", "s3")]);
        let gateway = Arc::new(gateway);
        let aggregator = ResourceAggregator::new(gateway.clone());

        let (resources, stats) = aggregator.aggregate_with_stats(&subscriptions());

        assert_eq!(names(&resources), vec!["a", "b", "c"]);
        assert_eq!(stats.strategy, Strategy::Fallback);
        assert_eq!(stats.subscriptions_failed, 1);
        assert_eq!(stats.bulk_error.as_deref(), Some("no pages returned"));
        assert_eq!(gateway.list_resources_count(), 3);
        assert_eq!(resources[2].subscription_name.as_deref(), Some("Sandbox"));
    }

    #[test]
    fn test_bulk_error_falls_back() {
        let gateway = ScriptedGateway::new()
            .with_graph_page(Err(AzureError::gateway("graph query", "extension missing")))
            .with_resources("s1", vec![make_resource("a", "s1")])
            .with_resources("s2", vec![])
            .with_resources("s3", vec![]);
        let aggregator = ResourceAggregator::new(Arc::new(gateway));

        let (resources, stats) = aggregator.aggregate_with_stats(&subscriptions());
        assert_eq!(names(&resources), vec!["a"]);
        assert_eq!(stats.strategy, Strategy::Fallback);
        assert!(stats.bulk_error.unwrap().contains("extension missing"));
    }

    #[test]
    fn test_bulk_error_mid_pagination_discards_partial_pages() {
        let gateway = ScriptedGateway::new()
            .with_graph_page(Ok(page(vec![make_resource("bulk", "s1")], Some("t1"))))
            .with_graph_page(Err(AzureError::gateway("graph query", "throttled")))
            .with_resources("s1", vec![make_resource("a", "s1")])
            .with_resources("s2", vec![make_resource("b", "s2")])
            .with_resources("s3", vec![]);
        let aggregator = ResourceAggregator::new(Arc::new(gateway));

        let resources = aggregator.aggregate_all(&subscriptions());
        assert_eq!(names(&resources), vec!["a", "b"]);
    }

    #[test]
    fn test_repeated_skip_token_falls_back() {
        let gateway = ScriptedGateway::new()
            .with_graph_page(Ok(page(vec![make_resource("bulk-1", "s1")], Some("t1"))))
            .with_graph_page(Ok(page(vec![make_resource("bulk-2", "s1")], Some("t1"))))
            .with_graph_page(Ok(page(vec![make_resource("bulk-3", "s1")], Some("t1"))))
            .with_resources("s1", vec![make_resource("a", "s1")])
            .with_resources("s2", vec![])
            .with_resources("s3", vec![]);
        let gateway = Arc::new(gateway);
        let aggregator = ResourceAggregator::new(gateway.clone());

        let (resources, stats) = aggregator.aggregate_with_stats(&subscriptions());
        assert_eq!(names(&resources), vec!["a"]);
        assert_eq!(stats.strategy, Strategy::Fallback);
        assert!(stats.bulk_error.unwrap().contains("skip token repeated"));
        assert_eq!(gateway.graph_count(), 2);
    }

    #[test]
    fn test_all_resources_without_subscriptions_is_not_cached() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_graph_page(Ok(page(vec![make_resource("a", "s1")], None))),
        );
        let aggregator = ResourceAggregator::new(gateway.clone());

        assert!(aggregator.all_resources(&[]).is_empty());
        assert_eq!(aggregator.cache_status(), CacheStatus::Empty);
        assert_eq!(gateway.graph_count(), 0);

        let resources = aggregator.all_resources(&subscriptions());
        assert_eq!(names(&resources), vec!["a"]);
    }

    #[test]
    fn test_every_subscription_failing_is_not_an_error() {
        let gateway = ScriptedGateway::new()
            .with_failing_subscription("s1")
            .with_failing_subscription("s2")
            .with_failing_subscription("s3");
        let aggregator = ResourceAggregator::new(Arc::new(gateway));

        let (resources, stats) = aggregator.aggregate_with_stats(&subscriptions());
        assert!(resources.is_empty());
        assert_eq!(stats.subscriptions_failed, 3);
        assert_eq!(stats.strategy, Strategy::Fallback);
    }

    #[test]
    fn test_empty_subscription_list_uses_bulk_result() {
        let gateway = Arc::new(ScriptedGateway::new());
        let aggregator = ResourceAggregator::new(gateway.clone());

        let (resources, stats) = aggregator.aggregate_with_stats(&[]);
        assert!(resources.is_empty());
        assert_eq!(stats.strategy, Strategy::Bulk);
        assert_eq!(gateway.list_resources_count(), 0);
    }

    #[test]
    fn test_all_resources_is_cached_for_session() {
        let gateway = ScriptedGateway::new()
            .with_graph_page(Ok(page(vec![make_resource("a", "s1")], None)))
            .with_graph_page(Ok(page(vec![make_resource("z", "s1")], None)));
        let gateway = Arc::new(gateway);
        let aggregator = ResourceAggregator::new(gateway.clone());

        assert_eq!(aggregator.cache_status(), CacheStatus::Empty);
        let first = aggregator.all_resources(&subscriptions());
        let second = aggregator.all_resources(&subscriptions());

        assert_eq!(names(&first), vec!["a"]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gateway.graph_count(), 1);
        assert_eq!(aggregator.cache_status(), CacheStatus::Loaded { resources: 1 });
        assert!(aggregator.last_stats().is_some());
    }

    #[test]
    fn test_list_resources_surfaces_errors() {
        let gateway = ScriptedGateway::new().with_failing_subscription("s1");
        let aggregator = ResourceAggregator::new(Arc::new(gateway));
        let result = aggregator.list_resources(&Subscription::new("s1", "Production"));
        assert!(matches!(result, Err(AzureError::Gateway { .. })));
    }

    #[test]
    fn test_set_default_subscription() {
        let gateway = Arc::new(ScriptedGateway::new());
        let aggregator = ResourceAggregator::new(gateway.clone());
        aggregator
            .set_default_subscription(&SubscriptionId::new("s2"))
            .unwrap();
        assert_eq!(
            *gateway.default_calls.lock().unwrap(),
            vec![SubscriptionId::new("s2")]
        );
    }
}
