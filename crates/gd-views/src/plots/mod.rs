//! Plot view implementations

pub mod bar;
pub mod bubble;
pub mod correlation;
pub mod encoding;
pub mod geo;
pub mod scatter;

// Utilities
pub mod utils;

// Re-exports
pub use bar::{build_bars, BarArtifact, BarChartView};
pub use bubble::{build_bubbles, bubble_radii, BubbleArtifact, BubblePlotView};
pub use correlation::{build_correlation, CorrelationMatrix, CorrelationView};
pub use encoding::{HueEncoding, HueSeries};
pub use geo::{build_choropleth, ChoroplethArtifact, ChoroplethView};
pub use scatter::{build_scatter, ScatterArtifact, ScatterPlotView};

use std::sync::Arc;

use egui::Ui;
use gd_core::{FilterSelection, Reactive};
use gd_data::{DataError, FilteredTable};
use tracing::debug;

use crate::ViewerContext;

/// Read the filtered table and return the view's artifact, rebuilding it
/// only when one of the cell's inputs changed
pub(crate) fn current_artifact<T, F>(
    ctx: &ViewerContext,
    cell: &mut Reactive<Arc<T>>,
    view: &str,
    build: F,
) -> Result<Arc<T>, DataError>
where
    F: FnOnce(&FilteredTable, &FilterSelection) -> Result<T, DataError>,
{
    let table = ctx.filtered_table()?;
    if cell.is_stale(&ctx.filters) {
        debug!("Rebuilding {} for {} rows", view, table.num_rows());
    }
    cell.try_get_or_compute(&ctx.filters, |selection| build(&table, selection).map(Arc::new))
        .cloned()
}

pub(crate) fn no_data_ui(ui: &mut Ui) {
    ui.centered_and_justified(|ui| {
        ui.label("No data to display");
    });
}

pub(crate) fn error_ui(ui: &mut Ui, error: &DataError) {
    debug!("Panel unavailable: {}", error);
    ui.centered_and_justified(|ui| {
        ui.colored_label(ui.visuals().error_fg_color, format!("Failed to build panel: {error}"));
    });
}

/// Place the hue key to the right of a chart when the hue is numeric.
/// Categorical hues use the plot legend instead.
pub(crate) fn with_hue_key<R>(ui: &mut Ui, hue: &HueEncoding, add_plot: impl FnOnce(&mut Ui) -> R) -> R {
    match hue {
        HueEncoding::Categorical { .. } => add_plot(ui),
        HueEncoding::Continuous { .. } => {
            ui.horizontal_top(|ui| {
                let size = egui::vec2((ui.available_width() - 90.0).max(120.0), ui.available_height());
                let inner = ui.allocate_ui(size, add_plot).inner;
                ui.vertical(|ui| hue.legend_ui(ui));
                inner
            })
            .inner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_base, select_everything};
    use crate::{GridView, SpaceViewId};
    use gd_core::events::EventBus;
    use gd_core::{DataField, FilterState};

    #[test]
    fn test_panels_rebuild_only_for_their_own_inputs() {
        let base = sample_base();
        let filters = Arc::new(FilterState::new(select_everything(&base)));
        let ctx = ViewerContext::new(base, filters.clone(), Arc::new(EventBus::new()));

        let mut map = ChoroplethView::new(SpaceViewId::new_v4(), "Maps".to_string());
        let mut grid = GridView::new(SpaceViewId::new_v4(), "Data Grid".to_string());
        let mut scatter = ScatterPlotView::new(SpaceViewId::new_v4(), "Scatterplots".to_string());

        let map_before = map.artifact(&ctx).unwrap();
        let grid_before = grid.artifact(&ctx).unwrap();
        let scatter_before = scatter.artifact(&ctx).unwrap();

        filters.set_hue(DataField::LifeExp);
        let map_hue = map.artifact(&ctx).unwrap();
        let scatter_hue = scatter.artifact(&ctx).unwrap();
        assert!(!Arc::ptr_eq(&map_before, &map_hue));
        assert!(!Arc::ptr_eq(&scatter_before, &scatter_hue));
        assert!(Arc::ptr_eq(&grid_before, &grid.artifact(&ctx).unwrap()));

        filters.set_x_axis(DataField::GdpCap);
        assert!(Arc::ptr_eq(&map_hue, &map.artifact(&ctx).unwrap()));
        assert!(Arc::ptr_eq(&grid_before, &grid.artifact(&ctx).unwrap()));
        let scatter_x = scatter.artifact(&ctx).unwrap();
        assert!(!Arc::ptr_eq(&scatter_hue, &scatter_x));
        assert_eq!(scatter_x.x_field, DataField::GdpCap);

        filters.set_continents(["Asia"]);
        let map_asia = map.artifact(&ctx).unwrap();
        let grid_asia = grid.artifact(&ctx).unwrap();
        let scatter_asia = scatter.artifact(&ctx).unwrap();
        assert!(!Arc::ptr_eq(&map_hue, &map_asia));
        assert!(!Arc::ptr_eq(&grid_before, &grid_asia));
        assert!(!Arc::ptr_eq(&scatter_x, &scatter_asia));
        assert_eq!(grid_asia.num_rows(), 2);
        assert_eq!(map_asia.regions.len(), 1);
    }
}
