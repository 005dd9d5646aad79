//! Domain models for subscriptions and resources

mod history_entry;
mod resource;
mod subscription;

pub use history_entry::HistoryEntry;
pub use resource::{Resource, ResourceId, short_type};
pub use subscription::{Subscription, SubscriptionId};
