//! Panels of the GapMinder dashboard
//!
//! Every panel pairs a pure builder, which turns the filtered table and the
//! chosen fields into an artifact, with a [`SpaceView`] that caches the
//! artifact and draws it.

mod space_view;
mod viewport;
pub mod plots;
pub mod tables;

pub use space_view::{SpaceView, SpaceViewId};
pub use viewport::Viewport;
pub use tables::{GridView, GridConfig};
pub use plots::{BarChartView, BubblePlotView, ChoroplethView, CorrelationView, ScatterPlotView};

use std::sync::Arc;
use parking_lot::RwLock;
use gd_core::events::{events::FilteredTableRecomputed, EventBus};
use gd_core::{FilterState, HoveredData};
use gd_data::{BaseTable, DataError, FilteredTable, FilteredView, WorldBoundaries};

/// Context passed to views during rendering
#[derive(Clone)]
pub struct ViewerContext {
    /// The complete dataset
    pub base: Arc<BaseTable>,

    /// Current sidebar values
    pub filters: Arc<FilterState>,

    /// Filtered table shared by all panels
    pub filtered: Arc<RwLock<FilteredView>>,

    /// Country outlines for the map, when a boundaries file was given
    pub boundaries: Option<Arc<WorldBoundaries>>,

    /// Row currently under the pointer
    pub hovered_data: Arc<RwLock<HoveredData>>,

    pub events: Arc<EventBus>,
}

impl ViewerContext {
    pub fn new(base: Arc<BaseTable>, filters: Arc<FilterState>, events: Arc<EventBus>) -> Self {
        let hovered_data = Arc::new(RwLock::new(HoveredData::default()));

        // A hovered row may have been filtered away
        let hovered = hovered_data.clone();
        events.subscribe(move |_: &FilteredTableRecomputed| hovered.write().clear());

        Self {
            filtered: Arc::new(RwLock::new(FilteredView::new(base.clone()))),
            base,
            filters,
            boundaries: None,
            hovered_data,
            events,
        }
    }

    pub fn with_boundaries(mut self, boundaries: Arc<WorldBoundaries>) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    /// The filtered table for the current selection, recomputed on first
    /// read after a continent, country or year change
    pub fn filtered_table(&self) -> Result<Arc<FilteredTable>, DataError> {
        let (stale, table) = {
            let mut filtered = self.filtered.write();
            let stale = filtered.is_stale(&self.filters);
            (stale, filtered.current(&self.filters)?)
        };

        if stale {
            self.events.publish(FilteredTableRecomputed {
                revision: self.filters.revision(),
                row_count: table.num_rows(),
            });
        }
        Ok(table)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;
    use std::sync::Arc;

    use gd_core::{FilterSelection, CONTINENTS};
    use gd_data::sources::read_table;
    use gd_data::{filter_table, BaseTable, FilteredTable};

    pub const SAMPLE: &str = "\
country,continent,year,life_exp,population,gdp_cap,iso_alpha
Afghanistan,Asia,1952,28.801,8425333,779.4453145,AFG
Albania,Europe,1952,55.23,1282697,1601.056136,ALB
Angola,Africa,1962,34.0,4826015,4269.276742,AGO
Afghanistan,Asia,1957,30.332,9240934,820.8530296,AFG
Albania,Europe,2007,76.423,3600523,5937.029526,ALB
";

    pub fn table_from(csv: &str) -> Arc<BaseTable> {
        Arc::new(BaseTable::new(read_table(Cursor::new(csv)).unwrap(), "test").unwrap())
    }

    pub fn sample_base() -> Arc<BaseTable> {
        table_from(SAMPLE)
    }

    pub fn select_everything(base: &BaseTable) -> FilterSelection {
        let bounds = base.year_bounds().unwrap().unwrap();
        FilterSelection::select_all(CONTINENTS, base.countries().unwrap(), bounds)
    }

    pub fn filtered(base: &BaseTable, selection: &FilterSelection) -> FilteredTable {
        filter_table(base, selection).unwrap()
    }

    pub fn filtered_all(base: &BaseTable) -> FilteredTable {
        filtered(base, &select_everything(base))
    }

    /// Selection matching no row
    pub fn filtered_none(base: &BaseTable) -> FilteredTable {
        let mut selection = select_everything(base);
        selection.year_range = (2008, 2010);
        filtered(base, &selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recompute_event_only_when_stale() {
        let base = test_support::sample_base();
        let filters = Arc::new(FilterState::new(test_support::select_everything(&base)));
        let events = Arc::new(EventBus::new());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let sink = seen.clone();
        events.subscribe(move |e: &FilteredTableRecomputed| sink.lock().push(e.row_count));

        let ctx = ViewerContext::new(base, filters.clone(), events);
        assert_eq!(ctx.filtered_table().unwrap().num_rows(), 5);
        ctx.filtered_table().unwrap();
        filters.set_continents(["Asia"]);
        assert_eq!(ctx.filtered_table().unwrap().num_rows(), 2);

        assert_eq!(seen.lock().as_slice(), &[5, 2]);
    }

    #[test]
    fn test_hover_cleared_when_rows_change() {
        let base = test_support::sample_base();
        let filters = Arc::new(FilterState::new(test_support::select_everything(&base)));
        let ctx = ViewerContext::new(base, filters.clone(), Arc::new(EventBus::new()));
        ctx.filtered_table().unwrap();

        let hovered = HoveredData {
            view: Some("Scatterplots".into()),
            country: Some("Angola".into()),
            detail: Some("Angola".into()),
        };
        *ctx.hovered_data.write() = hovered.clone();

        filters.set_hue(gd_core::DataField::LifeExp);
        ctx.filtered_table().unwrap();
        assert_eq!(*ctx.hovered_data.read(), hovered);

        filters.set_continents(["Asia"]);
        ctx.filtered_table().unwrap();
        assert_eq!(*ctx.hovered_data.read(), HoveredData::default());
    }
}
