//! Action handler for resource operations
//!
//! Coordinates the session, history and favorites for user actions.

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use crate::error::AzResult;
use crate::favorites::FavoritesRegistry;
use crate::history::HistoryTracker;
use crate::models::{Resource, SubscriptionId};
use crate::session::SearchSession;

/// Proof that the user explicitly agreed to a destructive action
#[derive(Debug, Clone, Copy)]
pub struct Confirmation(());

impl Confirmation {
    /// The user confirmed
    pub fn granted() -> Self {
        Confirmation(())
    }

    /// Confirmation from a yes/no answer; `None` when declined
    pub fn from_answer(confirmed: bool) -> Option<Self> {
        confirmed.then(Self::granted)
    }
}

/// Handler for resource actions like open, favorite and clear history
pub struct ResourceActions {
    session: Arc<SearchSession>,
    history: Arc<HistoryTracker>,
    favorites: Arc<FavoritesRegistry>,
}

impl ResourceActions {
    /// Create a new action handler
    pub fn new(
        session: Arc<SearchSession>,
        history: Arc<HistoryTracker>,
        favorites: Arc<FavoritesRegistry>,
    ) -> Self {
        Self {
            session,
            history,
            favorites,
        }
    }

    /// Record an access and return the resource's portal URL
    pub fn open_in_portal(&self, resource: &Resource) -> Result<String> {
        self.history
            .record(resource.clone())
            .with_context(|| format!("Failed to record history for {}", resource.id))?;

        let url = self.session.aggregator().portal_url(&resource.id);
        info!("Opening {} in portal", resource.name);
        Ok(url)
    }

    /// Like [`open_in_portal`](Self::open_in_portal), then launch the browser
    pub fn launch_in_browser(&self, resource: &Resource) -> Result<String> {
        let url = self.open_in_portal(resource)?;
        open::that(&url).with_context(|| format!("Failed to open browser for {}", url))?;
        Ok(url)
    }

    /// Pin or unpin a resource
    ///
    /// Returns the new favorite state (true = pinned).
    pub fn toggle_favorite(&self, resource: &Resource) -> Result<bool> {
        let pinned = self.favorites.toggle(resource.clone())?;
        info!(
            "{} {}",
            if pinned { "Pinned" } else { "Unpinned" },
            resource.name
        );
        Ok(pinned)
    }

    /// Change the CLI default subscription
    pub fn set_default_subscription(&self, id: &SubscriptionId) -> AzResult<()> {
        self.session.set_default_subscription(id)
    }

    /// Erase the whole history
    pub fn clear_history(&self, _confirmation: Confirmation) -> Result<()> {
        self.history.clear()
    }
}
