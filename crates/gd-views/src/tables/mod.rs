//! Data grid view

mod column_filter;

pub use column_filter::{ColumnFilter, ColumnFilters, Comparison};

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use egui::{TextEdit, Ui};
use egui_extras::{Column, TableBuilder};
use gd_core::fields::columns;
use gd_core::{Reactive, FILTER_INPUTS};
use gd_data::DataError;
use serde_json::{json, Value};
use tracing::debug;

use crate::plots::{error_ui, no_data_ui};
use crate::{SpaceView, SpaceViewId, ViewerContext};

/// The filtered table as display text
#[derive(Debug, Clone, PartialEq)]
pub struct GridArtifact {
    pub columns: Vec<String>,
    /// Whether each column holds numbers
    pub numeric: Vec<bool>,
    /// Cell text, one `Vec` per row
    pub rows: Vec<Vec<String>>,
}

impl GridArtifact {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Indices of the rows passing every column filter, in table order
    pub fn visible_rows(&self, filters: &ColumnFilters) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filters.matches(row))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Every column of the table except the ISO code, rendered as text.
/// Nulls render as empty cells.
pub fn build_grid(batch: &RecordBatch) -> Result<GridArtifact, DataError> {
    let schema = batch.schema();
    let shown: Vec<usize> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| field.name() != columns::ISO_ALPHA)
        .map(|(i, _)| i)
        .collect();

    let columns = shown.iter().map(|&i| schema.field(i).name().clone()).collect();
    let numeric = shown
        .iter()
        .map(|&i| matches!(schema.field(i).data_type(), DataType::Int64 | DataType::Float64))
        .collect();

    let rows = (0..batch.num_rows())
        .map(|row| {
            shown
                .iter()
                .map(|&i| {
                    let array = batch.column(i);
                    if array.is_null(row) {
                        Ok(String::new())
                    } else {
                        cell_text(array, row)
                    }
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GridArtifact { columns, numeric, rows })
}

/// Whole-number floats such as population print without a fraction
fn cell_text(array: &ArrayRef, row: usize) -> Result<String, DataError> {
    if let Some(floats) = array.as_any().downcast_ref::<Float64Array>() {
        let v = floats.value(row);
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
            return Ok(format!("{}", v as i64));
        }
    }
    Ok(array_value_to_string(array, row)?)
}

/// Configuration for the grid view
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub show_row_numbers: bool,
    pub striped_rows: bool,
    /// Longer cell text is cut off with an ellipsis
    pub max_cell_chars: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: true,
            striped_rows: true,
            max_cell_chars: 50,
        }
    }
}

/// Rows passing the column filters, remembered with the inputs they came from
struct VisibleRows {
    grid: Arc<GridArtifact>,
    texts: Vec<String>,
    rows: Vec<usize>,
}

/// Grid of the filtered table with a filter box above each column
pub struct GridView {
    id: SpaceViewId,
    title: String,
    pub config: GridConfig,
    cell: Reactive<Arc<GridArtifact>>,
    filter_texts: Vec<String>,
    visible: Option<VisibleRows>,
}

impl GridView {
    pub fn new(id: SpaceViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: GridConfig::default(),
            cell: Reactive::new(FILTER_INPUTS.to_vec()),
            filter_texts: Vec::new(),
            visible: None,
        }
    }

    pub(crate) fn artifact(&mut self, ctx: &ViewerContext) -> Result<Arc<GridArtifact>, DataError> {
        crate::plots::current_artifact(ctx, &mut self.cell, "data grid", |table, _| build_grid(table.batch()))
    }

    fn visible_rows(&mut self, grid: &Arc<GridArtifact>) -> Vec<usize> {
        self.filter_texts.resize(grid.columns.len(), String::new());

        let fresh = self
            .visible
            .as_ref()
            .is_some_and(|v| Arc::ptr_eq(&v.grid, grid) && v.texts == self.filter_texts);
        if !fresh {
            let filters = ColumnFilters::parse(&self.filter_texts, &grid.numeric);
            let rows = grid.visible_rows(&filters);
            debug!("Grid shows {} of {} rows", rows.len(), grid.num_rows());
            self.visible = Some(VisibleRows {
                grid: grid.clone(),
                texts: self.filter_texts.clone(),
                rows,
            });
        }
        self.visible.as_ref().map(|v| v.rows.clone()).unwrap_or_default()
    }

    fn truncate(&self, text: &str) -> String {
        if text.chars().count() > self.config.max_cell_chars {
            let cut: String = text.chars().take(self.config.max_cell_chars).collect();
            format!("{cut}...")
        } else {
            text.to_string()
        }
    }

    fn table_ui(&mut self, ctx: &ViewerContext, ui: &mut Ui, grid: &GridArtifact, visible: &[usize]) {
        let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;
        let highlight = ui.visuals().selection.bg_fill;
        let hovered_country = ctx.hovered_data.read().country.clone();
        let country_col = grid.column_index(columns::COUNTRY);

        let mut builder = TableBuilder::new(ui)
            .striped(self.config.striped_rows)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .min_scrolled_height(0.0)
            .vscroll(true);

        if self.config.show_row_numbers {
            builder = builder.column(Column::initial(50.0).at_least(40.0));
        }
        for _ in &grid.columns {
            builder = builder.column(Column::initial(130.0).at_least(70.0).clip(true));
        }

        let show_row_numbers = self.config.show_row_numbers;
        let filter_texts = &mut self.filter_texts;
        let table = builder.header(48.0, |mut header| {
            if show_row_numbers {
                header.col(|ui| {
                    ui.strong("#");
                });
            }
            for (name, text) in grid.columns.iter().zip(filter_texts.iter_mut()) {
                header.col(|ui| {
                    ui.vertical(|ui| {
                        ui.strong(name);
                        ui.add(TextEdit::singleline(text).hint_text("filter"));
                    });
                });
            }
        });

        table.body(|body| {
            body.rows(text_height, visible.len(), |index, mut row| {
                let row_index = visible[index];
                let cells = &grid.rows[row_index];
                let is_highlighted = match (&hovered_country, country_col) {
                    (Some(country), Some(col)) => cells.get(col) == Some(country),
                    _ => false,
                };

                if show_row_numbers {
                    row.col(|ui| {
                        ui.label(row_index.to_string());
                    });
                }
                for cell in cells {
                    row.col(|ui| {
                        if is_highlighted {
                            ui.painter().rect_filled(ui.available_rect_before_wrap(), 0.0, highlight);
                        }
                        let text = self.truncate(cell);
                        let response = ui.label(text);
                        if cell.chars().count() > self.config.max_cell_chars {
                            response.on_hover_text(cell.as_str());
                        }
                    });
                }
            });
        });
    }
}

impl SpaceView for GridView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "GridView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let artifact = self.artifact(ctx);

        match artifact {
            Ok(grid) if grid.is_empty() => no_data_ui(ui),
            Ok(grid) => {
                let visible = self.visible_rows(&grid);
                ui.horizontal(|ui| {
                    ui.label(format!("{} of {} rows", visible.len(), grid.num_rows()));
                    let filtering = self.filter_texts.iter().any(|t| !t.trim().is_empty());
                    if filtering && ui.small_button("Clear filters").clicked() {
                        self.filter_texts.iter_mut().for_each(String::clear);
                    }
                });
                ui.separator();
                self.table_ui(ctx, ui, &grid, &visible);
            }
            Err(e) => error_ui(ui, &e),
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "show_row_numbers": self.config.show_row_numbers,
            "striped_rows": self.config.striped_rows,
            "max_cell_chars": self.config.max_cell_chars,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(show) = config.get("show_row_numbers").and_then(|v| v.as_bool()) {
            self.config.show_row_numbers = show;
        }
        if let Some(striped) = config.get("striped_rows").and_then(|v| v.as_bool()) {
            self.config.striped_rows = striped;
        }
        if let Some(max) = config.get("max_cell_chars").and_then(|v| v.as_u64()) {
            self.config.max_cell_chars = max as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{filtered_all, filtered_none, sample_base, table_from};

    #[test]
    fn test_projection_drops_iso_code() {
        let base = sample_base();
        let grid = build_grid(filtered_all(&base).batch()).unwrap();

        assert_eq!(
            grid.columns,
            vec!["country", "continent", "year", "life_exp", "population", "gdp_cap"]
        );
        assert_eq!(grid.numeric, vec![false, false, true, true, true, true]);
        assert_eq!(grid.num_rows(), 5);
        assert_eq!(grid.rows[0][0], "Afghanistan");
        assert_eq!(grid.rows[0][2], "1952");
        assert_eq!(grid.rows[0][3], "28.801");
        assert_eq!(grid.rows[0][4], "8425333");
        assert_eq!(grid.rows[0][5], "779.4453145");
    }

    #[test]
    fn test_whole_population_filters_as_number() {
        let base = sample_base();
        let grid = build_grid(filtered_all(&base).batch()).unwrap();
        let texts: Vec<String> = ["", "", "", "", "=1282697", ""].into_iter().map(String::from).collect();
        let filters = ColumnFilters::parse(&texts, &grid.numeric);
        assert_eq!(grid.visible_rows(&filters), vec![1]);
    }

    #[test]
    fn test_nulls_render_empty() {
        let base = table_from(
            "country,continent,year,life_exp,population,gdp_cap,iso_alpha\n\
             A,Asia,1952,,100,1,AAA\n",
        );
        let grid = build_grid(base.batch()).unwrap();
        assert_eq!(grid.rows[0][3], "");
    }

    #[test]
    fn test_visible_rows_with_column_filters() {
        let base = sample_base();
        let grid = build_grid(filtered_all(&base).batch()).unwrap();
        let texts: Vec<String> = ["", "europe", ">=1957", "", "", ""].into_iter().map(String::from).collect();
        let filters = ColumnFilters::parse(&texts, &grid.numeric);
        assert_eq!(grid.visible_rows(&filters), vec![4]);

        let texts: Vec<String> = ["a", "", "1950..1960", "", "", ""].into_iter().map(String::from).collect();
        let filters = ColumnFilters::parse(&texts, &grid.numeric);
        assert_eq!(grid.visible_rows(&filters), vec![0, 1, 3]);
    }

    #[test]
    fn test_view_caches_visible_rows() {
        let base = sample_base();
        let grid = Arc::new(build_grid(filtered_all(&base).batch()).unwrap());
        let mut view = GridView::new(SpaceViewId::new_v4(), "Data Grid".to_string());

        assert_eq!(view.visible_rows(&grid).len(), 5);
        view.filter_texts[0] = "ang".to_string();
        assert_eq!(view.visible_rows(&grid), vec![2]);
        assert_eq!(view.truncate("short"), "short");
        view.config.max_cell_chars = 3;
        assert_eq!(view.truncate("Afghanistan"), "Afg...");
    }

    #[test]
    fn test_empty_selection() {
        let base = sample_base();
        let grid = build_grid(filtered_none(&base).batch()).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.columns.len(), 6);
    }
}
