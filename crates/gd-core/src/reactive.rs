//! Lazily recomputed derived values
//!
//! A [`Reactive`] cell remembers which inputs it was derived from and the
//! filter revision it was computed at. Reading it after any of those inputs
//! changed recomputes the value; otherwise the cached value is returned.

use crate::filters::{FilterSelection, FilterState, InputId};

/// A derived value with declared input dependencies
#[derive(Debug, Clone)]
pub struct Reactive<T> {
    depends_on: Vec<InputId>,
    computed_at: Option<u64>,
    value: Option<T>,
}

impl<T> Reactive<T> {
    pub fn new(depends_on: impl Into<Vec<InputId>>) -> Self {
        Self {
            depends_on: depends_on.into(),
            computed_at: None,
            value: None,
        }
    }

    /// Whether the next read will recompute
    pub fn is_stale(&self, state: &FilterState) -> bool {
        match self.computed_at {
            None => true,
            Some(at) => state.latest_revision(&self.depends_on) > at,
        }
    }

    /// Cached value, if any, without checking staleness
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Return the cached value, recomputing it first if stale
    pub fn get_or_compute<F>(&mut self, state: &FilterState, compute: F) -> &T
    where
        F: FnOnce(&FilterSelection) -> T,
    {
        match self.try_get_or_compute::<_, std::convert::Infallible>(state, |s| Ok(compute(s))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`Reactive::get_or_compute`]. A failed computation
    /// leaves the cell stale.
    pub fn try_get_or_compute<F, E>(&mut self, state: &FilterState, compute: F) -> Result<&T, E>
    where
        F: FnOnce(&FilterSelection) -> Result<T, E>,
    {
        if self.is_stale(state) {
            self.value = None;
            self.computed_at = None;
        }

        let value = match self.value.take() {
            Some(value) => value,
            None => {
                let (selection, revision) = state.snapshot_with_revision();
                let value = compute(&selection)?;
                self.computed_at = Some(revision);
                value
            }
        };
        Ok(self.value.insert(value))
    }
}
