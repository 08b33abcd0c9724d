//! Filter subscriber trait

use super::FilterChange;

/// Trait for components that need to respond to filter changes
pub trait FilterSubscriber: Send + Sync {
    /// Called synchronously after one or more inputs changed
    fn on_filter_change(&self, change: &FilterChange);
}
