//! Scatter plot implementation

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use egui::{Color32, Pos2, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, PlotUi, Points};
use gd_core::fields::columns;
use gd_core::{DataField, HoveredData, InputId, Reactive, FILTER_INPUTS};
use gd_data::DataError;
use serde_json::{json, Value};

use super::encoding::{format_value, numeric_values, string_values, HueEncoding};
use super::{current_artifact, error_ui, no_data_ui, with_hue_key};
use crate::{SpaceView, SpaceViewId, ViewerContext};

/// Pointer distance in points within which a marker counts as hovered
const HOVER_DISTANCE: f32 = 8.0;

/// Outline drawn around the hovered marker
pub(crate) const HIGHLIGHT: Color32 = Color32::from_rgb(255, 127, 14);

/// One plotted row
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub country: String,
}

/// Indices into [`ScatterArtifact::points`] sharing one hue colour
#[derive(Debug, Clone, PartialEq)]
pub struct PointGroup {
    pub name: Option<String>,
    pub color: Color32,
    pub points: Vec<usize>,
}

/// Everything needed to draw the scatter plot
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterArtifact {
    pub x_field: DataField,
    pub y_field: DataField,
    pub points: Vec<ScatterPoint>,
    pub groups: Vec<PointGroup>,
    pub hue: HueEncoding,
}

impl ScatterArtifact {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Tooltip text for one point
    pub fn describe(&self, index: usize) -> Option<String> {
        let point = self.points.get(index)?;
        Some(format!(
            "{}\n{}: {}\n{}: {}",
            point.country,
            self.x_field.column_name(),
            format_value(point.x),
            self.y_field.column_name(),
            format_value(point.y)
        ))
    }
}

/// One point per row with both x and y present
pub fn build_scatter(
    batch: &RecordBatch,
    x_field: DataField,
    y_field: DataField,
    hue_field: DataField,
) -> Result<ScatterArtifact, DataError> {
    let xs = numeric_values(batch, x_field)?;
    let ys = numeric_values(batch, y_field)?;
    let countries = string_values(batch, columns::COUNTRY)?;
    let hue = HueEncoding::build(batch, hue_field)?;

    let points: Vec<ScatterPoint> = xs
        .iter()
        .zip(&ys)
        .enumerate()
        .filter_map(|(row, (x, y))| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(ScatterPoint {
                row,
                x: *x,
                y: *y,
                country: countries[row].clone().unwrap_or_default(),
            }),
            _ => None,
        })
        .collect();

    // Table rows are increasing along `points`, so a row maps back by search
    let groups = hue
        .series(points.iter().map(|p| p.row))
        .into_iter()
        .map(|series| PointGroup {
            name: series.name,
            color: series.color,
            points: series
                .rows
                .iter()
                .filter_map(|row| points.binary_search_by_key(row, |p| p.row).ok())
                .collect(),
        })
        .collect();

    Ok(ScatterArtifact { x_field, y_field, points, groups, hue })
}

/// Closest candidate to `target` no further than `max_distance`
pub(crate) fn nearest_within(
    candidates: impl IntoIterator<Item = (usize, Pos2, f32)>,
    target: Pos2,
    max_distance: f32,
) -> Option<usize> {
    candidates
        .into_iter()
        .filter_map(|(index, pos, radius)| {
            let distance = pos.distance(target);
            (distance <= max_distance.max(radius)).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Index of the point under the pointer, using per-point marker radii
pub(crate) fn hovered_point(plot_ui: &PlotUi, points: &[ScatterPoint], radii: Option<&[f32]>) -> Option<usize> {
    let pointer = plot_ui.pointer_coordinate()?;
    let target = plot_ui.screen_from_plot(pointer);
    let candidates = points.iter().enumerate().map(|(i, p)| {
        let radius = radii.and_then(|r| r.get(i)).copied().unwrap_or(0.0);
        (i, plot_ui.screen_from_plot(PlotPoint::new(p.x, p.y)), radius)
    });
    nearest_within(candidates, target, HOVER_DISTANCE)
}

/// Publish the hovered point so other panels can see it
pub(crate) fn update_hovered(ctx: &ViewerContext, view: &str, data: &ScatterArtifact, hovered: Option<usize>) {
    let mut current = ctx.hovered_data.write();
    match hovered.and_then(|i| data.points.get(i).map(|point| (i, point))) {
        Some((index, point)) => {
            *current = HoveredData {
                view: Some(view.to_string()),
                country: Some(point.country.clone()),
                detail: data.describe(index),
            };
        }
        None if current.view.as_deref() == Some(view) => current.clear(),
        None => {}
    }
}

/// Configuration for scatter plot view
#[derive(Debug, Clone)]
pub struct ScatterPlotConfig {
    /// Base point radius
    pub point_radius: f32,
    pub show_grid: bool,
    pub marker_shape: MarkerShape,
}

impl Default for ScatterPlotConfig {
    fn default() -> Self {
        Self {
            point_radius: 4.0,
            show_grid: true,
            marker_shape: MarkerShape::Circle,
        }
    }
}

/// Scatter plot view
pub struct ScatterPlotView {
    id: SpaceViewId,
    title: String,
    pub config: ScatterPlotConfig,
    cell: Reactive<Arc<ScatterArtifact>>,
}

impl ScatterPlotView {
    pub fn new(id: SpaceViewId, title: String) -> Self {
        let mut inputs = FILTER_INPUTS.to_vec();
        inputs.extend([InputId::XAxis, InputId::YAxis, InputId::Hue]);
        Self {
            id,
            title,
            config: ScatterPlotConfig::default(),
            cell: Reactive::new(inputs),
        }
    }

    pub(crate) fn artifact(&mut self, ctx: &ViewerContext) -> Result<Arc<ScatterArtifact>, DataError> {
        current_artifact(ctx, &mut self.cell, "scatter plot", |table, selection| {
            build_scatter(table.batch(), selection.x_axis, selection.y_axis, selection.hue)
        })
    }

    fn plot_ui(&self, ctx: &ViewerContext, ui: &mut Ui, data: &ScatterArtifact) {
        let plot = Plot::new(self.id)
            .legend(Legend::default())
            .show_grid(self.config.show_grid)
            .x_axis_label(data.x_field.column_name())
            .y_axis_label(data.y_field.column_name())
            .allow_zoom(true)
            .allow_drag(true)
            .allow_boxed_zoom(true);

        let response = plot.show(ui, |plot_ui| {
            for group in &data.groups {
                let coords: Vec<[f64; 2]> = group
                    .points
                    .iter()
                    .map(|&i| [data.points[i].x, data.points[i].y])
                    .collect();
                let mut points = Points::new(PlotPoints::new(coords))
                    .color(group.color)
                    .radius(self.config.point_radius)
                    .shape(self.config.marker_shape);
                if let Some(name) = &group.name {
                    points = points.name(name);
                }
                plot_ui.points(points);
            }

            let hovered = hovered_point(plot_ui, &data.points, None);
            if let Some(point) = hovered.and_then(|i| data.points.get(i)) {
                plot_ui.points(
                    Points::new(vec![[point.x, point.y]])
                        .color(HIGHLIGHT)
                        .radius(self.config.point_radius * 2.0)
                        .filled(false),
                );
            }
            hovered
        });

        let hovered = response.inner;
        update_hovered(ctx, &self.title, data, hovered);
        if let Some(text) = hovered.and_then(|i| data.describe(i)) {
            response.response.on_hover_text_at_pointer(text);
        }
    }
}

impl SpaceView for ScatterPlotView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "ScatterPlotView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let artifact = self.artifact(ctx);

        ui.heading("Interactive Scatter Plot");
        match artifact {
            Ok(data) if data.is_empty() => no_data_ui(ui),
            Ok(data) => with_hue_key(ui, &data.hue, |ui| self.plot_ui(ctx, ui, &data)),
            Err(e) => error_ui(ui, &e),
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "point_radius": self.config.point_radius,
            "show_grid": self.config.show_grid,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(radius) = config.get("point_radius").and_then(|v| v.as_f64()) {
            self.config.point_radius = radius as f32;
        }
        if let Some(show_grid) = config.get("show_grid").and_then(|v| v.as_bool()) {
            self.config.show_grid = show_grid;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{filtered, filtered_none, sample_base, select_everything, table_from};
    use egui::pos2;

    #[test]
    fn test_points_and_groups() {
        let base = sample_base();
        let mut selection = select_everything(&base);
        selection.continents = ["Asia", "Europe"].into_iter().map(String::from).collect();
        let table = filtered(&base, &selection);

        let data = build_scatter(table.batch(), DataField::GdpCap, DataField::LifeExp, DataField::Continent).unwrap();
        assert_eq!(data.points.len(), 4);
        assert_eq!(data.points[0].country, "Afghanistan");
        assert_eq!(data.groups.len(), 2);
        assert_eq!(data.groups[0].points, vec![0, 2]);
        assert_eq!(data.groups[1].points, vec![1, 3]);
        assert!(data.describe(0).unwrap().starts_with("Afghanistan\ngdp_cap: 779.45"));
    }

    #[test]
    fn test_rows_missing_a_coordinate_are_skipped() {
        let base = table_from(
            "country,continent,year,life_exp,population,gdp_cap,iso_alpha\n\
             A,Asia,1952,,100,1,AAA\n\
             B,Asia,1957,50,200,2,BBB\n",
        );
        let data = build_scatter(base.batch(), DataField::Year, DataField::LifeExp, DataField::Population).unwrap();
        assert_eq!(data.points.len(), 1);
        assert_eq!(data.points[0].row, 1);
        assert_eq!(data.groups[0].points, vec![0]);
    }

    #[test]
    fn test_empty_selection() {
        let base = sample_base();
        let data = build_scatter(filtered_none(&base).batch(), DataField::Year, DataField::LifeExp, DataField::Population)
            .unwrap();
        assert!(data.is_empty());
        assert!(data.groups.is_empty());
    }

    #[test]
    fn test_nearest_within() {
        let candidates = vec![(0, pos2(0.0, 0.0), 0.0), (1, pos2(5.0, 0.0), 0.0), (2, pos2(40.0, 0.0), 30.0)];
        assert_eq!(nearest_within(candidates.clone(), pos2(4.0, 0.0), 8.0), Some(1));
        assert_eq!(nearest_within(candidates.clone(), pos2(20.0, 0.0), 8.0), Some(2));
        assert_eq!(nearest_within(candidates[..2].to_vec(), pos2(20.0, 0.0), 8.0), None);
    }
}
