//! Resource actions module
//!
//! User-triggered mutations: opening a resource in the portal, pinning it,
//! changing the default subscription and clearing history.

mod handler;

pub use handler::{Confirmation, ResourceActions};
