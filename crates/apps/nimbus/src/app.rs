//! Application wiring
//!
//! Builds the session, stores and action handler from settings and exposes
//! the operations the command line needs.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use azure::{
    AzCli, DirectoryGateway, FavoritesRegistry, FieldFilter, HistoryTracker, HomeView,
    InMemoryItemStore, ItemStore, Resource, ResourceActions, ResourceId, ResourceSummary,
    SearchResponse, SearchSession, Settings, SqliteItemStore, Subscription, SubscriptionId,
    home_view, summarize,
};
use log::{info, warn};

pub struct NimbusApp {
    gateway: Arc<dyn DirectoryGateway>,
    session: Arc<SearchSession>,
    history: Arc<HistoryTracker>,
    favorites: Arc<FavoritesRegistry>,
    pub actions: ResourceActions,
}

impl NimbusApp {
    pub fn new(settings: Settings) -> Result<Self> {
        let store = open_store(&settings)?;
        let gateway: Arc<dyn DirectoryGateway> = Arc::new(AzCli::new(settings));
        let session = Arc::new(SearchSession::new(gateway.clone()));
        let history = Arc::new(HistoryTracker::new(store.clone()));
        let favorites = Arc::new(FavoritesRegistry::new(store));
        let actions = ResourceActions::new(session.clone(), history.clone(), favorites.clone());

        Ok(Self {
            gateway,
            session,
            history,
            favorites,
            actions,
        })
    }

    /// Pass the availability gate and load subscriptions
    pub fn start(&self) -> Result<Vec<Subscription>> {
        self.session.ensure_ready()?;
        Ok(self.session.load_subscriptions()?)
    }

    /// Search one subscription, or all of them when `subscription` is `None`
    pub fn search(
        &self,
        text: &str,
        subscription: Option<&str>,
        type_filter: FieldFilter,
        location_filter: FieldFilter,
    ) -> Result<SearchResponse> {
        match subscription {
            Some(id) => {
                self.session
                    .select_subscription(&SubscriptionId::new(id))?
                    .context("Subscription selection was superseded")?;
            }
            None => self.session.clear_selection(),
        }
        self.session.set_filters(type_filter, location_filter);

        let response = self
            .session
            .search(text)?
            .context("Search was superseded")?;
        Ok(response)
    }

    pub fn summarize(&self, resources: &[Resource]) -> Vec<ResourceSummary> {
        summarize(resources, &self.favorites, self.gateway.as_ref())
    }

    pub fn home(&self) -> HomeView {
        home_view(&self.history, &self.favorites, self.gateway.as_ref())
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    pub fn favorites(&self) -> &FavoritesRegistry {
        &self.favorites
    }

    /// Find a resource by id in favorites, history, then the full aggregate
    ///
    /// Ids compare exactly, the same way favorites and history do.
    pub fn find_resource(&self, id: &ResourceId) -> Result<Resource> {
        if let Some(resource) = known_resource(&self.favorites, &self.history, id) {
            return Ok(resource);
        }

        let subscriptions = self.start()?;
        let all = self.session.aggregator().all_resources(&subscriptions);
        match all.iter().find(|r| &r.id == id) {
            Some(resource) => Ok(resource.clone()),
            None => bail!("Resource not found: {}", id),
        }
    }
}

/// A pinned or recently opened resource with exactly this id
fn known_resource(
    favorites: &FavoritesRegistry,
    history: &HistoryTracker,
    id: &ResourceId,
) -> Option<Resource> {
    favorites
        .list()
        .into_iter()
        .chain(history.list().into_iter().map(|entry| entry.resource))
        .find(|r| &r.id == id)
}

fn open_store(settings: &Settings) -> Result<Arc<dyn ItemStore>> {
    match settings.store_path() {
        Some(path) => {
            info!("Using store at {}", path.display());
            let store = SqliteItemStore::new(&path)
                .with_context(|| format!("Failed to open store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("No config directory; history and favorites will not persist");
            Ok(Arc::new(InMemoryItemStore::new()))
        }
    }
}
