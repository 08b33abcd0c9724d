//! Filter state with per-input revision tracking

use super::{FilterChange, FilterSelection, FilterSubscriber, InputId};
use crate::fields::DataField;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// State stored behind the lock
#[derive(Debug, Clone)]
struct SelectionState {
    selection: FilterSelection,
    /// Bumped on every change of any input
    revision: u64,
    /// Revision at which each input last changed
    input_revisions: AHashMap<InputId, u64>,
}

/// Current control values shared by the sidebar and every view
pub struct FilterState {
    state: Arc<RwLock<SelectionState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn FilterSubscriber>>>>,
}

impl FilterState {
    /// Create a new filter state at revision 0
    pub fn new(selection: FilterSelection) -> Self {
        let state = SelectionState {
            selection,
            revision: 0,
            input_revisions: InputId::ALL.into_iter().map(|id| (id, 0)).collect(),
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Copy of the current selection
    pub fn snapshot(&self) -> FilterSelection {
        self.state.read().selection.clone()
    }

    /// Copy of the current selection together with the revision it belongs to
    pub fn snapshot_with_revision(&self) -> (FilterSelection, u64) {
        let state = self.state.read();
        (state.selection.clone(), state.revision)
    }

    /// Current global revision
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Revision at which `id` last changed
    pub fn input_revision(&self, id: InputId) -> u64 {
        self.state.read().input_revisions.get(&id).copied().unwrap_or(0)
    }

    /// Latest revision among `inputs`
    pub fn latest_revision(&self, inputs: &[InputId]) -> u64 {
        let state = self.state.read();
        inputs
            .iter()
            .filter_map(|id| state.input_revisions.get(id))
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Apply an edit to the selection.
    ///
    /// Only inputs whose values actually changed get a new revision; an edit
    /// that leaves everything as it was is a no-op and notifies nobody.
    pub fn update<F>(&self, edit: F) -> Vec<InputId>
    where
        F: FnOnce(&mut FilterSelection),
    {
        let mut state = self.state.write();
        let mut next = state.selection.clone();
        edit(&mut next);

        let changed = state.selection.changed_inputs(&next);
        if changed.is_empty() {
            return changed;
        }

        state.revision += 1;
        let revision = state.revision;
        for id in &changed {
            state.input_revisions.insert(*id, revision);
        }
        state.selection = next;

        let change = FilterChange {
            revision,
            changed: changed.clone(),
            selection: state.selection.clone(),
        };
        drop(state);

        tracing::debug!("Filter revision {} changed {:?}", revision, change.changed);
        self.notify_subscribers(&change);
        changed
    }

    /// Replace the whole selection
    pub fn replace(&self, selection: FilterSelection) -> Vec<InputId> {
        self.update(|current| *current = selection)
    }

    pub fn set_continents<I, S>(&self, continents: I) -> Vec<InputId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let continents = continents.into_iter().map(Into::into).collect();
        self.update(|s| s.continents = continents)
    }

    pub fn set_countries<I, S>(&self, countries: I) -> Vec<InputId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let countries = countries.into_iter().map(Into::into).collect();
        self.update(|s| s.countries = countries)
    }

    pub fn set_year_range(&self, lo: i64, hi: i64) -> Vec<InputId> {
        self.update(|s| s.year_range = (lo, hi))
    }

    pub fn set_x_axis(&self, field: DataField) -> Vec<InputId> {
        self.update(|s| s.x_axis = field)
    }

    pub fn set_y_axis(&self, field: DataField) -> Vec<InputId> {
        self.update(|s| s.y_axis = field)
    }

    pub fn set_hue(&self, field: DataField) -> Vec<InputId> {
        self.update(|s| s.hue = field)
    }

    pub fn set_size(&self, field: DataField) -> Vec<InputId> {
        self.update(|s| s.size = field)
    }

    pub fn set_size_scale(&self, scale: u32) -> Vec<InputId> {
        self.update(|s| s.size_scale = scale)
    }

    /// Add a subscriber. Only a weak reference is kept.
    pub fn add_subscriber(&self, subscriber: Arc<dyn FilterSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    fn notify_subscribers(&self, change: &FilterChange) {
        let live: Vec<Arc<dyn FilterSubscriber>> = {
            let mut subscribers = self.subscribers.write();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        // The list is unlocked here so subscribers may add subscribers
        for subscriber in live {
            subscriber.on_filter_change(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn state() -> FilterState {
        FilterState::new(FilterSelection::select_all(
            ["Asia", "Europe"],
            ["Afghanistan", "Albania"],
            (1952, 2007),
        ))
    }

    struct Recorder {
        seen: Mutex<Vec<Vec<InputId>>>,
    }

    impl FilterSubscriber for Recorder {
        fn on_filter_change(&self, change: &FilterChange) {
            self.seen.lock().push(change.changed.clone());
        }
    }

    #[test]
    fn test_update_bumps_only_changed_inputs() {
        let state = state();
        assert_eq!(state.revision(), 0);

        let changed = state.set_year_range(1960, 1970);
        assert_eq!(changed, vec![InputId::Year]);
        assert_eq!(state.revision(), 1);
        assert_eq!(state.input_revision(InputId::Year), 1);
        assert_eq!(state.input_revision(InputId::Country), 0);

        state.set_x_axis(DataField::GdpCap);
        assert_eq!(state.revision(), 2);
        assert_eq!(state.latest_revision(&[InputId::Continent, InputId::Year]), 1);
        assert_eq!(state.latest_revision(&[InputId::XAxis, InputId::Year]), 2);
    }

    #[test]
    fn test_noop_update_keeps_revision() {
        let state = state();
        let changed = state.set_year_range(1952, 2007);
        assert!(changed.is_empty());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_subscribers_notified_and_pruned() {
        let state = state();
        let recorder = Arc::new(Recorder { seen: Mutex::new(Vec::new()) });
        state.add_subscriber(recorder.clone());

        state.set_countries(["Albania"]);
        state.set_countries(["Albania"]);
        assert_eq!(recorder.seen.lock().as_slice(), &[vec![InputId::Country]]);

        drop(recorder);
        state.set_hue(DataField::Continent);
        assert!(state.subscribers.read().is_empty());
    }

    struct Spawner {
        state: Arc<FilterState>,
        spawned: Mutex<Vec<Arc<Recorder>>>,
    }

    impl FilterSubscriber for Spawner {
        fn on_filter_change(&self, _change: &FilterChange) {
            let recorder = Arc::new(Recorder { seen: Mutex::new(Vec::new()) });
            self.state.add_subscriber(recorder.clone());
            self.spawned.lock().push(recorder);
        }
    }

    #[test]
    fn test_subscriber_can_subscribe_during_notification() {
        let state = Arc::new(state());
        let spawner = Arc::new(Spawner { state: state.clone(), spawned: Mutex::new(Vec::new()) });
        state.add_subscriber(spawner.clone());

        state.set_year_range(1960, 1970);
        assert_eq!(spawner.spawned.lock().len(), 1);

        state.set_hue(DataField::LifeExp);
        let spawned = spawner.spawned.lock();
        assert_eq!(spawned.len(), 2);
        assert_eq!(spawned[0].seen.lock().as_slice(), &[vec![InputId::Hue]]);
    }
}
