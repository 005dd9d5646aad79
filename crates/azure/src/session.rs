//! Search session
//!
//! Holds the state a resource browser needs between user actions: the
//! availability gate, the subscription list, the selected subscription and
//! its resources, and the active type/location filters. Searches are tagged
//! with a request generation so a superseded result is never applied.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info};

use crate::aggregate::{CacheStatus, ResourceAggregator};
use crate::error::{AzResult, AzureError};
use crate::gateway::DirectoryGateway;
use crate::models::{Resource, Subscription, SubscriptionId};
use crate::search::{
    DISPLAY_LIMIT, FieldFilter, SearchOutcome, SearchQuery, distinct_locations, distinct_types,
    search_capped,
};

/// Monotonic counter identifying the latest user request
#[derive(Debug, Default)]
pub struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

/// Whether a search must pull in the aggregate of every subscription
///
/// Only a non-empty free-text query with no subscription selected does.
pub fn should_load_all(text: &str, has_selection: bool) -> bool {
    !has_selection && !text.is_empty()
}

/// Which collection a search runs over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    Subscription(SubscriptionId),
    AllSubscriptions,
}

/// A search captured at the moment the user issued it
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub generation: u64,
    pub scope: SearchScope,
    pub query: SearchQuery,
}

/// Results of a search that was still current when it finished
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub generation: u64,
    pub scope: SearchScope,
    pub outcome: SearchOutcome,
    /// Filter choices derived from the searched collection
    pub types: Vec<String>,
    pub locations: Vec<String>,
}

struct Selection {
    subscription: Subscription,
    resources: Arc<Vec<Resource>>,
}

struct SessionState {
    ready: bool,
    subscriptions: Vec<Subscription>,
    selection: Option<Selection>,
    type_filter: FieldFilter,
    location_filter: FieldFilter,
}

/// Decrements the in-flight counter when a slow call finishes
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Stateful front for browsing and searching resources
pub struct SearchSession {
    aggregator: ResourceAggregator,
    generation: RequestGeneration,
    in_flight: AtomicUsize,
    state: Mutex<SessionState>,
}

impl SearchSession {
    pub fn new(gateway: Arc<dyn DirectoryGateway>) -> Self {
        Self {
            aggregator: ResourceAggregator::new(gateway),
            generation: RequestGeneration::new(),
            in_flight: AtomicUsize::new(0),
            state: Mutex::new(SessionState {
                ready: false,
                subscriptions: Vec::new(),
                selection: None,
                type_filter: FieldFilter::All,
                location_filter: FieldFilter::All,
            }),
        }
    }

    pub fn aggregator(&self) -> &ResourceAggregator {
        &self.aggregator
    }

    /// Probe the CLI and open the gate for data operations
    pub fn ensure_ready(&self) -> AzResult<()> {
        let status = self.aggregator.gateway().check_availability();
        let result = if !status.installed {
            Err(AzureError::Unavailable)
        } else if !status.logged_in {
            Err(AzureError::Unauthenticated)
        } else {
            Ok(())
        };

        self.state.lock().unwrap().ready = result.is_ok();
        result
    }

    fn require_ready(&self) -> AzResult<()> {
        if self.state.lock().unwrap().ready {
            return Ok(());
        }
        self.ensure_ready()
    }

    /// Fetch the subscription list and keep it for the session
    pub fn load_subscriptions(&self) -> AzResult<Vec<Subscription>> {
        self.require_ready()?;
        let _loading = InFlight::start(&self.in_flight);

        let subscriptions = self.aggregator.list_subscriptions()?;
        info!("Loaded {} subscriptions", subscriptions.len());
        self.state.lock().unwrap().subscriptions = subscriptions.clone();
        Ok(subscriptions)
    }

    /// Subscriptions loaded so far
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state.lock().unwrap().subscriptions.clone()
    }

    /// Select a subscription and fetch its resources
    ///
    /// Resets both filters. Returns `None` when another request superseded
    /// this one while the fetch was running; the result is then discarded.
    pub fn select_subscription(&self, id: &SubscriptionId) -> AzResult<Option<Arc<Vec<Resource>>>> {
        self.require_ready()?;
        let generation = self.generation.next();

        let subscription = {
            let mut state = self.state.lock().unwrap();
            state.type_filter = FieldFilter::All;
            state.location_filter = FieldFilter::All;
            state
                .subscriptions
                .iter()
                .find(|s| s.id == *id)
                .cloned()
                .ok_or_else(|| {
                    AzureError::gateway("resource list", format!("unknown subscription {}", id))
                })?
        };

        let resources = {
            let _loading = InFlight::start(&self.in_flight);
            Arc::new(self.aggregator.list_resources(&subscription)?)
        };

        if !self.generation.is_current(generation) {
            debug!("Discarding stale resources for {}", id);
            return Ok(None);
        }

        info!("Selected {} ({} resources)", subscription.name, resources.len());
        self.state.lock().unwrap().selection = Some(Selection {
            subscription,
            resources: resources.clone(),
        });
        Ok(Some(resources))
    }

    /// Return to the all-subscriptions view
    pub fn clear_selection(&self) {
        self.generation.next();
        let mut state = self.state.lock().unwrap();
        state.selection = None;
        state.type_filter = FieldFilter::All;
        state.location_filter = FieldFilter::All;
    }

    pub fn selected_subscription(&self) -> Option<Subscription> {
        self.state
            .lock()
            .unwrap()
            .selection
            .as_ref()
            .map(|s| s.subscription.clone())
    }

    pub fn set_filters(&self, type_filter: FieldFilter, location_filter: FieldFilter) {
        let mut state = self.state.lock().unwrap();
        state.type_filter = type_filter;
        state.location_filter = location_filter;
    }

    pub fn filters(&self) -> (FieldFilter, FieldFilter) {
        let state = self.state.lock().unwrap();
        (state.type_filter.clone(), state.location_filter.clone())
    }

    /// Capture a search with the current scope and filters
    pub fn begin_search(&self, text: &str) -> SearchRequest {
        let generation = self.generation.next();
        let state = self.state.lock().unwrap();
        let scope = match &state.selection {
            Some(selection) => SearchScope::Subscription(selection.subscription.id.clone()),
            None => SearchScope::AllSubscriptions,
        };

        SearchRequest {
            generation,
            scope,
            query: SearchQuery::new(text)
                .with_type(state.type_filter.clone())
                .with_location(state.location_filter.clone()),
        }
    }

    /// Run a captured search
    ///
    /// Returns `None` when the request was superseded before it finished.
    pub fn execute(&self, request: &SearchRequest) -> AzResult<Option<SearchResponse>> {
        self.require_ready()?;

        let (resources, limit) = match &request.scope {
            SearchScope::Subscription(id) => {
                let state = self.state.lock().unwrap();
                match &state.selection {
                    Some(selection) if selection.subscription.id == *id => {
                        let resources = selection.resources.clone();
                        let limit = resources.len();
                        (resources, limit)
                    }
                    _ => return Ok(None),
                }
            }
            SearchScope::AllSubscriptions => (self.all_resources(&request.query.text)?, DISPLAY_LIMIT),
        };

        if !self.generation.is_current(request.generation) {
            debug!("Discarding stale search #{}", request.generation);
            return Ok(None);
        }

        Ok(Some(SearchResponse {
            generation: request.generation,
            scope: request.scope.clone(),
            outcome: search_capped(&resources, &request.query, limit),
            types: distinct_types(&resources),
            locations: distinct_locations(&resources),
        }))
    }

    /// Capture and run a search in one step
    pub fn search(&self, text: &str) -> AzResult<Option<SearchResponse>> {
        let request = self.begin_search(text);
        self.execute(&request)
    }

    /// Aggregate used in all-subscriptions mode
    ///
    /// Loads it on the first non-empty query; otherwise only what is cached.
    /// The subscription list is fetched first if it was never loaded.
    fn all_resources(&self, text: &str) -> AzResult<Arc<Vec<Resource>>> {
        if !should_load_all(text, false) {
            return Ok(self.aggregator.cached_resources().unwrap_or_default());
        }

        let mut subscriptions = self.subscriptions();
        if subscriptions.is_empty() {
            subscriptions = self.load_subscriptions()?;
        }

        let _loading = InFlight::start(&self.in_flight);
        Ok(self.aggregator.all_resources(&subscriptions))
    }

    /// Whether a slow fetch is currently running
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
            || self.aggregator.cache_status() == CacheStatus::Loading
    }

    /// Change the CLI default and mirror the flag in the loaded list
    pub fn set_default_subscription(&self, id: &SubscriptionId) -> AzResult<()> {
        self.require_ready()?;
        self.aggregator.set_default_subscription(id)?;

        let mut state = self.state.lock().unwrap();
        for subscription in state.subscriptions.iter_mut() {
            subscription.is_default = subscription.id == *id;
        }
        if let Some(selection) = state.selection.as_mut() {
            selection.subscription.is_default = selection.subscription.id == *id;
        }
        Ok(())
    }
}
