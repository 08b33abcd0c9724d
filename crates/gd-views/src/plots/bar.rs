//! Bar chart implementation

use std::sync::Arc;

use ahash::AHashMap;
use arrow::record_batch::RecordBatch;
use egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};
use gd_core::fields::columns;
use gd_core::{DataField, InputId, Reactive, FILTER_INPUTS};
use gd_data::DataError;
use serde_json::{json, Value};

use super::encoding::{format_value, numeric_values, string_values, HueEncoding};
use super::{current_artifact, error_ui, no_data_ui, with_hue_key};
use crate::{SpaceView, SpaceViewId, ViewerContext};

/// Fraction of the smallest gap between x positions a bar occupies
const BAR_FILL: f64 = 0.8;

/// One bar, stacked on the bars before it at the same x
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub row: usize,
    pub x: f64,
    /// Where the bar starts: the running total of earlier bars at this x
    pub base: f64,
    pub value: f64,
    pub country: String,
}

/// Bars sharing one hue colour
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub name: Option<String>,
    pub color: Color32,
    pub bars: Vec<StackedBar>,
}

/// Everything needed to draw the bar chart
#[derive(Debug, Clone, PartialEq)]
pub struct BarArtifact {
    pub x_field: DataField,
    pub y_field: DataField,
    pub groups: Vec<BarGroup>,
    pub width: f64,
    pub hue: HueEncoding,
}

impl BarArtifact {
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.bars.is_empty())
    }

    /// All bars in table order
    pub fn bars(&self) -> Vec<&StackedBar> {
        let mut bars: Vec<&StackedBar> = self.groups.iter().flat_map(|g| &g.bars).collect();
        bars.sort_by_key(|bar| bar.row);
        bars
    }
}

/// One bar per row at (x, y). Bars at the same x stack in table order,
/// positive values upwards from zero and negative values downwards.
/// Rows missing x or y are left out.
pub fn build_bars(
    batch: &RecordBatch,
    x_field: DataField,
    y_field: DataField,
    hue_field: DataField,
) -> Result<BarArtifact, DataError> {
    let xs = numeric_values(batch, x_field)?;
    let ys = numeric_values(batch, y_field)?;
    let countries = string_values(batch, columns::COUNTRY)?;
    let hue = HueEncoding::build(batch, hue_field)?;

    // x -> (top of positive stack, bottom of negative stack)
    let mut stacks: AHashMap<u64, (f64, f64)> = AHashMap::new();
    let mut bars: AHashMap<usize, StackedBar> = AHashMap::new();
    let mut rows = Vec::new();

    for (row, (x, y)) in xs.iter().zip(&ys).enumerate() {
        let (Some(x), Some(y)) = (*x, *y) else { continue };
        if !x.is_finite() || !y.is_finite() {
            continue;
        }

        let stack = stacks.entry(x.to_bits()).or_insert((0.0, 0.0));
        let base = if y >= 0.0 {
            let base = stack.0;
            stack.0 += y;
            base
        } else {
            let base = stack.1;
            stack.1 += y;
            base
        };

        rows.push(row);
        bars.insert(row, StackedBar {
            row,
            x,
            base,
            value: y,
            country: countries[row].clone().unwrap_or_default(),
        });
    }

    let width = bar_width(stacks.keys().map(|bits| f64::from_bits(*bits)));

    let groups = hue
        .series(rows)
        .into_iter()
        .map(|series| BarGroup {
            name: series.name,
            color: series.color,
            bars: series.rows.iter().filter_map(|row| bars.remove(row)).collect(),
        })
        .collect();

    Ok(BarArtifact { x_field, y_field, groups, width, hue })
}

/// Width filling [`BAR_FILL`] of the smallest gap between distinct x values
fn bar_width(xs: impl Iterator<Item = f64>) -> f64 {
    let mut xs: Vec<f64> = xs.collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();

    xs.windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .reduce(f64::min)
        .map(|gap| gap * BAR_FILL)
        .unwrap_or(BAR_FILL)
}

/// Bar chart configuration
#[derive(Debug, Clone)]
pub struct BarChartConfig {
    pub show_legend: bool,
    pub show_grid: bool,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_grid: true,
        }
    }
}

/// Bar chart view
pub struct BarChartView {
    id: SpaceViewId,
    title: String,
    pub config: BarChartConfig,
    cell: Reactive<Arc<BarArtifact>>,
}

impl BarChartView {
    /// Create a new bar chart view
    pub fn new(id: SpaceViewId, title: String) -> Self {
        let mut inputs = FILTER_INPUTS.to_vec();
        inputs.extend([InputId::XAxis, InputId::YAxis, InputId::Hue]);
        Self {
            id,
            title,
            config: BarChartConfig::default(),
            cell: Reactive::new(inputs),
        }
    }

    fn plot_ui(&self, ui: &mut Ui, data: &BarArtifact) {
        let mut plot = Plot::new(self.id)
            .show_grid(self.config.show_grid)
            .x_axis_label(data.x_field.column_name())
            .y_axis_label(data.y_field.column_name())
            .allow_zoom(true)
            .allow_drag(true)
            .allow_boxed_zoom(true);
        if self.config.show_legend {
            plot = plot.legend(Legend::default());
        }

        let x_label = data.x_field.column_name().to_string();
        let y_label = data.y_field.column_name().to_string();

        plot.show(ui, |plot_ui| {
            for group in &data.groups {
                let bars = group
                    .bars
                    .iter()
                    .map(|bar| {
                        Bar::new(bar.x, bar.value)
                            .base_offset(bar.base)
                            .width(data.width)
                            .name(&bar.country)
                            .fill(group.color)
                    })
                    .collect();

                let (x_label, y_label) = (x_label.clone(), y_label.clone());
                let mut chart = BarChart::new(bars)
                    .color(group.color)
                    .element_formatter(Box::new(move |bar: &Bar, _: &BarChart| {
                        format!(
                            "{}\n{}: {}\n{}: {}",
                            bar.name,
                            x_label,
                            format_value(bar.argument),
                            y_label,
                            format_value(bar.value)
                        )
                    }));
                if let Some(name) = &group.name {
                    chart = chart.name(name);
                }
                plot_ui.bar_chart(chart);
            }
        });
    }
}

impl SpaceView for BarChartView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "BarChartView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let artifact = current_artifact(ctx, &mut self.cell, "bar chart", |table, selection| {
            build_bars(table.batch(), selection.x_axis, selection.y_axis, selection.hue)
        });

        ui.heading("Interactive Bar Chart");
        match artifact {
            Ok(data) if data.is_empty() => no_data_ui(ui),
            Ok(data) => with_hue_key(ui, &data.hue, |ui| self.plot_ui(ui, &data)),
            Err(e) => error_ui(ui, &e),
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "show_legend": self.config.show_legend,
            "show_grid": self.config.show_grid,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(show_legend) = config.get("show_legend").and_then(|v| v.as_bool()) {
            self.config.show_legend = show_legend;
        }
        if let Some(show_grid) = config.get("show_grid").and_then(|v| v.as_bool()) {
            self.config.show_grid = show_grid;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{filtered_all, filtered_none, sample_base, table_from};

    #[test]
    fn test_stacking_in_table_order() {
        let base = table_from(
            "country,continent,year,life_exp,population,gdp_cap,iso_alpha\n\
             A,Asia,1952,10,1,1,AAA\n\
             B,Asia,1952,20,1,1,BBB\n\
             C,Europe,1952,-5,1,1,CCC\n\
             D,Europe,1952,-2,1,1,DDD\n\
             E,Asia,1957,7,1,1,EEE\n",
        );
        let data = build_bars(base.batch(), DataField::Year, DataField::LifeExp, DataField::Continent).unwrap();
        let bars = data.bars();

        let stacked: Vec<(&str, f64, f64)> = bars.iter().map(|b| (b.country.as_str(), b.base, b.value)).collect();
        assert_eq!(
            stacked,
            vec![
                ("A", 0.0, 10.0),
                ("B", 10.0, 20.0),
                ("C", 0.0, -5.0),
                ("D", -5.0, -2.0),
                ("E", 0.0, 7.0),
            ]
        );
        assert!((data.width - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_groups_follow_hue_categories() {
        let base = sample_base();
        let table = filtered_all(&base);
        let data = build_bars(table.batch(), DataField::Year, DataField::LifeExp, DataField::Continent).unwrap();

        let names: Vec<Option<&str>> = data.groups.iter().map(|g| g.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Asia"), Some("Europe"), Some("Africa")]);
        assert_eq!(data.groups[0].bars.len(), 2);
        assert_eq!(data.bars().len(), 5);
    }

    #[test]
    fn test_single_x_and_empty_table() {
        assert_eq!(bar_width([1952.0, 1952.0].into_iter()), BAR_FILL);
        assert_eq!(bar_width(std::iter::empty()), BAR_FILL);

        let base = sample_base();
        let data = build_bars(filtered_none(&base).batch(), DataField::Year, DataField::LifeExp, DataField::Population)
            .unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_config_round_trip() {
        let mut view = BarChartView::new(SpaceViewId::new_v4(), "Bar Charts".into());
        view.load_config(json!({ "show_legend": false }));
        assert!(!view.config.show_legend);
        assert_eq!(view.save_config()["show_grid"], json!(true));
    }
}
