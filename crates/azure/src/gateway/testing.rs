//! Scripted in-memory gateway for unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CliStatus, DirectoryGateway, GraphPage};
use crate::error::{AzResult, AzureError};
use crate::models::{Resource, Subscription, SubscriptionId};

/// Gateway whose answers are set up front by the test
pub(crate) struct ScriptedGateway {
    pub status: CliStatus,
    pub subscriptions: AzResult<Vec<Subscription>>,
    /// Per-subscription answers; unknown ids fail
    pub resources: HashMap<String, AzResult<Vec<Resource>>>,
    /// Graph pages returned in order, one per call
    pub graph_pages: Mutex<VecDeque<AzResult<GraphPage>>>,
    pub default_calls: Mutex<Vec<SubscriptionId>>,
    pub list_resources_calls: AtomicUsize,
    pub graph_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            status: CliStatus::ready(),
            subscriptions: Ok(Vec::new()),
            resources: HashMap::new(),
            graph_pages: Mutex::new(VecDeque::new()),
            default_calls: Mutex::new(Vec::new()),
            list_resources_calls: AtomicUsize::new(0),
            graph_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_subscriptions(mut self, subscriptions: Vec<Subscription>) -> Self {
        self.subscriptions = Ok(subscriptions);
        self
    }

    pub fn with_resources(mut self, subscription_id: &str, resources: Vec<Resource>) -> Self {
        self.resources.insert(subscription_id.to_string(), Ok(resources));
        self
    }

    pub fn with_failing_subscription(mut self, subscription_id: &str) -> Self {
        self.resources.insert(
            subscription_id.to_string(),
            Err(AzureError::gateway("resource list", "scripted failure")),
        );
        self
    }

    pub fn with_graph_page(self, page: AzResult<GraphPage>) -> Self {
        self.graph_pages.lock().unwrap().push_back(page);
        self
    }

    pub fn with_status(mut self, status: CliStatus) -> Self {
        self.status = status;
        self
    }

    pub fn list_resources_count(&self) -> usize {
        self.list_resources_calls.load(Ordering::SeqCst)
    }

    pub fn graph_count(&self) -> usize {
        self.graph_calls.load(Ordering::SeqCst)
    }
}

impl DirectoryGateway for ScriptedGateway {
    fn check_availability(&self) -> CliStatus {
        self.status
    }

    fn list_subscriptions(&self) -> AzResult<Vec<Subscription>> {
        self.subscriptions.clone()
    }

    fn list_resources(
        &self,
        subscription_id: &SubscriptionId,
        subscription_name: &str,
    ) -> AzResult<Vec<Resource>> {
        self.list_resources_calls.fetch_add(1, Ordering::SeqCst);
        match self.resources.get(subscription_id.as_str()) {
            Some(Ok(resources)) => Ok(resources
                .iter()
                .cloned()
                .map(|r| r.with_subscription_name(subscription_name))
                .collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(AzureError::gateway("resource list", "unknown subscription")),
        }
    }

    fn query_resources_page(
        &self,
        _subscription_ids: &[SubscriptionId],
        _skip_token: Option<&str>,
    ) -> AzResult<GraphPage> {
        self.graph_calls.fetch_add(1, Ordering::SeqCst);
        self.graph_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GraphPage::default()))
    }

    fn set_default_subscription(&self, id: &SubscriptionId) -> AzResult<()> {
        self.default_calls.lock().unwrap().push(id.clone());
        Ok(())
    }
}
