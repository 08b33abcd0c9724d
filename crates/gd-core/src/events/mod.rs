//! Typed publish/subscribe between the loader, the filter state and the views

use std::any::{Any, TypeId};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

/// Marker for values that can travel over the [`EventBus`]
pub trait Event: Any + Send + Sync {}

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Dashboard-wide event bus
///
/// Handlers run on the publishing thread after the handler table has been
/// unlocked, so a handler may publish or subscribe itself.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<AHashMap<TypeId, Vec<Handler>>>,
}

/// Dashboard lifecycle events
pub mod events {
    use super::Event;

    /// The dataset was read and validated
    #[derive(Debug, Clone)]
    pub struct DatasetLoaded {
        pub source_name: String,
        pub row_count: usize,
        pub column_count: usize,
    }

    /// The dataset could not be read
    #[derive(Debug, Clone)]
    pub struct DatasetError {
        pub source_name: String,
        pub error: String,
    }

    /// A sidebar input changed
    #[derive(Debug, Clone)]
    pub struct FilterChanged {
        pub revision: u64,
        pub inputs: Vec<String>,
    }

    /// The filtered table was rebuilt for a new selection
    #[derive(Debug, Clone)]
    pub struct FilteredTableRecomputed {
        pub revision: u64,
        pub row_count: usize,
    }

    impl Event for DatasetLoaded {}
    impl Event for DatasetError {}
    impl Event for FilterChanged {}
    impl Event for FilteredTableRecomputed {}
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every published `E`
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });
        self.handlers.write().entry(TypeId::of::<E>()).or_default().push(handler);
    }

    pub fn publish<E: Event>(&self, event: E) {
        let handlers = self
            .handlers
            .read()
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();

        for handler in handlers {
            handler(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::events::{DatasetLoaded, FilterChanged};
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_publish_reaches_matching_handlers_only() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe(move |loaded: &DatasetLoaded| sink.lock().push(loaded.row_count));

        bus.publish(FilterChanged { revision: 1, inputs: vec!["Year".into()] });
        bus.publish(DatasetLoaded { source_name: "gapminder.csv".into(), row_count: 1704, column_count: 7 });

        assert_eq!(seen.lock().as_slice(), &[1704]);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = Arc::new(EventBus::new());
        let revisions = Arc::new(Mutex::new(Vec::new()));

        let forward = bus.clone();
        bus.subscribe(move |loaded: &DatasetLoaded| {
            forward.publish(FilterChanged { revision: loaded.row_count as u64, inputs: Vec::new() });
        });
        let sink = revisions.clone();
        bus.subscribe(move |changed: &FilterChanged| sink.lock().push(changed.revision));

        bus.publish(DatasetLoaded { source_name: "gapminder.csv".into(), row_count: 3, column_count: 7 });
        assert_eq!(revisions.lock().as_slice(), &[3]);
    }
}
