//! Bubble plot: a scatter plot whose marker size follows a third field

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use egui::Ui;
use egui_plot::{Legend, Plot, Points};
use gd_core::{DataField, InputId, RangeControl, Reactive, SelectControl, FILTER_INPUTS};
use gd_data::DataError;
use gd_ui::widgets::{range_slider, select_control};
use serde_json::{json, Value};
use tracing::debug;

use super::encoding::{format_value, numeric_values};
use super::scatter::{build_scatter, hovered_point, update_hovered, ScatterArtifact, HIGHLIGHT};
use super::{current_artifact, error_ui, no_data_ui, with_hue_key};
use crate::{SpaceView, SpaceViewId, ViewerContext};

/// Everything needed to draw the bubble plot
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleArtifact {
    pub scatter: ScatterArtifact,
    pub size_field: DataField,
    /// Radius of the largest bubble, in points
    pub size_max: f32,
    /// One radius per entry of `scatter.points`
    pub radii: Vec<f32>,
    /// Size value per entry of `scatter.points`
    pub sizes: Vec<Option<f64>>,
}

impl BubbleArtifact {
    pub fn is_empty(&self) -> bool {
        self.scatter.is_empty()
    }

    pub fn describe(&self, index: usize) -> Option<String> {
        let text = self.scatter.describe(index)?;
        let size = self.sizes.get(index).copied().flatten().unwrap_or(f64::NAN);
        Some(format!("{text}\n{}: {}", self.size_field.column_name(), format_value(size)))
    }
}

/// Linear size scale: the largest value gets `size_max`, zero gets nothing.
/// Negative and missing values are drawn at radius 0, as is every value of
/// a column without a positive entry.
pub fn bubble_radii(values: &[Option<f64>], size_max: f64) -> Vec<f64> {
    let largest = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    values
        .iter()
        .map(|value| match value {
            Some(v) if largest > 0.0 && v.is_finite() && *v > 0.0 => size_max * v / largest,
            _ => 0.0,
        })
        .collect()
}

/// Scatter points with a radius per point taken from `size_field`. The scale
/// is computed over the plotted points only.
pub fn build_bubbles(
    batch: &RecordBatch,
    x_field: DataField,
    y_field: DataField,
    hue_field: DataField,
    size_field: DataField,
    size_scale: u32,
) -> Result<BubbleArtifact, DataError> {
    let scatter = build_scatter(batch, x_field, y_field, hue_field)?;
    let all_sizes = numeric_values(batch, size_field)?;
    let sizes: Vec<Option<f64>> = scatter.points.iter().map(|p| all_sizes[p.row]).collect();

    let size_max = size_scale as f32;
    let radii = bubble_radii(&sizes, size_max as f64)
        .into_iter()
        .map(|r| r as f32)
        .collect();

    Ok(BubbleArtifact {
        scatter,
        size_field,
        size_max,
        radii,
        sizes,
    })
}

/// Configuration for the bubble plot view
#[derive(Debug, Clone)]
pub struct BubblePlotConfig {
    pub show_grid: bool,
    /// Fill opacity of the bubbles
    pub opacity: f32,
}

impl Default for BubblePlotConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            opacity: 0.7,
        }
    }
}

/// Bubble plot view with its own size controls
pub struct BubblePlotView {
    id: SpaceViewId,
    title: String,
    pub config: BubblePlotConfig,
    size_control: SelectControl,
    scale_control: RangeControl,
    cell: Reactive<Arc<BubbleArtifact>>,
}

impl BubblePlotView {
    pub fn new(id: SpaceViewId, title: String, size_control: SelectControl, scale_control: RangeControl) -> Self {
        let mut inputs = FILTER_INPUTS.to_vec();
        inputs.extend([InputId::XAxis, InputId::YAxis, InputId::Hue, InputId::Size, InputId::SizeScale]);
        Self {
            id,
            title,
            config: BubblePlotConfig::default(),
            size_control,
            scale_control,
            cell: Reactive::new(inputs),
        }
    }

    fn size_controls_ui(&self, ctx: &ViewerContext, ui: &mut Ui) {
        let selection = ctx.filters.snapshot();
        let mut size = selection.size;
        let mut scale = selection.size_scale as i64;

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.set_width(180.0);
                if select_control(ui, &self.size_control, &mut size) {
                    debug!("Bubble size field set to {}", size);
                    ctx.filters.set_size(size);
                }
            });
            ui.vertical(|ui| {
                ui.set_width(220.0);
                if range_slider(ui, &self.scale_control, &mut scale) {
                    if let Ok(scale) = self.scale_control.validate(scale) {
                        ctx.filters.set_size_scale(scale as u32);
                    }
                }
            });
        });
    }

    fn plot_ui(&self, ctx: &ViewerContext, ui: &mut Ui, data: &BubbleArtifact) {
        let scatter = &data.scatter;
        let plot = Plot::new(self.id)
            .legend(Legend::default())
            .show_grid(self.config.show_grid)
            .x_axis_label(scatter.x_field.column_name())
            .y_axis_label(scatter.y_field.column_name())
            .allow_zoom(true)
            .allow_drag(true);

        let response = plot.show(ui, |plot_ui| {
            // Points carries one radius per item, so each bubble is its own item.
            // Only the first bubble of a group is named to keep the legend short.
            for group in &scatter.groups {
                let color = group.color.gamma_multiply(self.config.opacity);
                for (n, &i) in group.points.iter().enumerate() {
                    let point = &scatter.points[i];
                    let mut bubble = Points::new(vec![[point.x, point.y]])
                        .color(color)
                        .radius(data.radii[i])
                        .filled(true);
                    if n == 0 {
                        if let Some(name) = &group.name {
                            bubble = bubble.name(name);
                        }
                    }
                    plot_ui.points(bubble);
                }
            }

            let hovered = hovered_point(plot_ui, &scatter.points, Some(&data.radii));
            if let Some(i) = hovered {
                let point = &scatter.points[i];
                plot_ui.points(
                    Points::new(vec![[point.x, point.y]])
                        .color(HIGHLIGHT)
                        .radius(data.radii[i].max(4.0) + 2.0)
                        .filled(false),
                );
            }
            hovered
        });

        let hovered = response.inner;
        update_hovered(ctx, &self.title, scatter, hovered);
        if let Some(text) = hovered.and_then(|i| data.describe(i)) {
            response.response.on_hover_text_at_pointer(text);
        }
    }
}

impl SpaceView for BubblePlotView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "BubblePlotView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.size_controls_ui(ctx, ui);
        ui.separator();

        let artifact = current_artifact(ctx, &mut self.cell, "bubble plot", |table, selection| {
            build_bubbles(
                table.batch(),
                selection.x_axis,
                selection.y_axis,
                selection.hue,
                selection.size,
                selection.size_scale,
            )
        });

        ui.heading("Interactive Bubble Plot");
        match artifact {
            Ok(data) if data.is_empty() => no_data_ui(ui),
            Ok(data) => with_hue_key(ui, &data.scatter.hue, |ui| self.plot_ui(ctx, ui, &data)),
            Err(e) => error_ui(ui, &e),
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "show_grid": self.config.show_grid,
            "opacity": self.config.opacity,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(show_grid) = config.get("show_grid").and_then(|v| v.as_bool()) {
            self.config.show_grid = show_grid;
        }
        if let Some(opacity) = config.get("opacity").and_then(|v| v.as_f64()) {
            self.config.opacity = (opacity as f32).clamp(0.05, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{filtered_all, filtered_none, sample_base, table_from};

    #[test]
    fn test_linear_radii() {
        let radii = bubble_radii(&[Some(10.0), Some(5.0), Some(0.0), None, Some(-3.0)], 20.0);
        assert_eq!(radii, vec![20.0, 10.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_all_zero_column() {
        assert_eq!(bubble_radii(&[Some(0.0), Some(0.0)], 20.0), vec![0.0, 0.0]);
        assert!(bubble_radii(&[], 20.0).is_empty());
    }

    #[test]
    fn test_largest_population_gets_size_scale() {
        let base = sample_base();
        let table = filtered_all(&base);
        let data = build_bubbles(
            table.batch(),
            DataField::GdpCap,
            DataField::LifeExp,
            DataField::Continent,
            DataField::Population,
            30,
        )
        .unwrap();

        assert_eq!(data.radii.len(), 5);
        // Afghanistan 1957 has the largest population in the sample
        assert_eq!(data.radii[3], 30.0);
        assert!(data.radii[1] < data.radii[0]);
        assert!(data.describe(3).unwrap().ends_with("population: 9.24M"));
    }

    #[test]
    fn test_radii_follow_plotted_points() {
        let base = table_from(
            "country,continent,year,life_exp,population,gdp_cap,iso_alpha\n\
             A,Asia,1952,,400,1,AAA\n\
             B,Asia,1957,50,200,2,BBB\n\
             C,Asia,1962,60,100,3,CCC\n",
        );
        let data = build_bubbles(
            base.batch(),
            DataField::Year,
            DataField::LifeExp,
            DataField::Continent,
            DataField::Population,
            10,
        )
        .unwrap();
        // Row A has no y value, so B is the largest plotted bubble
        assert_eq!(data.radii, vec![10.0, 5.0]);
    }

    #[test]
    fn test_empty_selection() {
        let base = sample_base();
        let data = build_bubbles(
            filtered_none(&base).batch(),
            DataField::Year,
            DataField::LifeExp,
            DataField::Population,
            DataField::Population,
            10,
        )
        .unwrap();
        assert!(data.is_empty());
        assert!(data.radii.is_empty());
    }
}
